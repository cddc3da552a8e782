//! Configuration
//!
//! Layered configuration built with figment: defaults, then a TOML file,
//! then `SCENEDI_`-prefixed environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{AppConfig, ContainerConfig, DemoConfig, LoggingConfig};
