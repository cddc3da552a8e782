//! Configuration types

pub mod app;
pub mod container;
pub mod demo;
pub mod logging;

pub use app::AppConfig;
pub use container::ContainerConfig;
pub use demo::DemoConfig;
pub use logging::LoggingConfig;
