//! Demo scene configuration types

use crate::constants::{
    DEFAULT_DEMO_IMAGE_COUNT, DEFAULT_DEMO_PALETTE_LIFETIME, DEFAULT_DEMO_REMOVALS,
};
use scenedi_domain::{Lifetime, Result};
use serde::{Deserialize, Serialize};

/// Parameters of the scripted demo run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Images spawned under the image container
    pub image_count: usize,

    /// Images removed again, picked at random
    pub removals: usize,

    /// RNG seed; random when absent
    pub seed: Option<u64>,

    /// Lifetime tag for the palette dependency
    pub palette_lifetime: String,
}

impl DemoConfig {
    /// Parsed palette lifetime; unknown tags fail with `UnknownLifetime`
    pub fn palette_lifetime(&self) -> Result<Lifetime> {
        self.palette_lifetime.parse()
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            image_count: DEFAULT_DEMO_IMAGE_COUNT,
            removals: DEFAULT_DEMO_REMOVALS,
            seed: None,
            palette_lifetime: DEFAULT_DEMO_PALETTE_LIFETIME.to_string(),
        }
    }
}
