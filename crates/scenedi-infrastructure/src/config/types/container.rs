//! Container configuration types

use crate::constants::{DEFAULT_ROOT_CONTAINER_NAME, DEFAULT_SCREEN_CONTAINER_NAME};
use serde::{Deserialize, Serialize};

/// Names of the containers the host builds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Name of the root container
    pub root_name: String,

    /// Name of the per-screen child container
    pub screen_name: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_CONTAINER_NAME.to_string(),
            screen_name: DEFAULT_SCREEN_CONTAINER_NAME.to_string(),
        }
    }
}
