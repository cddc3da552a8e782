//! Application configuration root

use super::{ContainerConfig, DemoConfig, LoggingConfig};
use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging setup
    pub logging: LoggingConfig,

    /// Container naming
    pub container: ContainerConfig,

    /// Demo scene parameters
    pub demo: DemoConfig,
}
