//! # Infrastructure Layer
//!
//! Runtime machinery behind the domain ports: the lifecycle event bus, the
//! dependency injection container, configuration and logging.
//!
//! ### Lifecycle & DI
//! | Module | Description |
//! |--------|-------------|
//! | [`events`] | Event bus, RAII tracking guard, enable/disable switch |
//! | [`di`] | Containers, descriptors, registration and injection |
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | TOML + environment configuration via figment |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod events;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, ConfigLoader};
pub use di::{Container, ContainerBuilder, InjectionReport};
pub use error_ext::ErrorContext;
pub use events::{EventBus, LifecycleSwitch, Rewiring, SubscriptionId, Tracked};
