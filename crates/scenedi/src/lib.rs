//! # scenedi
//!
//! Lifecycle-driven dependency injection for a game scripting layer.
//!
//! Objects announce themselves on an [`EventBus`](infrastructure::EventBus)
//! when they become active and inactive. Containers listen to those events:
//! they fill the object's declared slots, keep live-instance filters up to
//! date, and reference-count shared dependencies so they are released when
//! their last user goes away.
//!
//! ## Example
//!
//! ```
//! use scenedi::infrastructure::{Container, EventBus, Tracked};
//! use scenedi::{Injectable, Injected, SlotTable};
//! use std::sync::Arc;
//!
//! struct Logger;
//!
//! #[derive(Default)]
//! struct Enemy {
//!     logger: Injected<Logger>,
//! }
//!
//! impl Injectable for Enemy {
//!     fn slot_table() -> SlotTable<Self> {
//!         SlotTable::new().dependency("logger", |s: &Self| &s.logger)
//!     }
//! }
//!
//! let bus = EventBus::new();
//! let container = Container::new(&bus);
//! container
//!     .register_shared::<Logger, _>(|_| Some(Arc::new(Logger)))
//!     .unwrap();
//!
//! let enemy = Tracked::new(&bus, Enemy::default());
//! assert!(enemy.logger.is_set());
//! assert_eq!(container.ref_count::<Logger>(), Some(1));
//!
//! drop(enemy);
//! assert_eq!(container.ref_count::<Logger>(), Some(0));
//! ```
//!
//! ## Architecture
//!
//! - `domain` - keys, lifetimes, filters, lifecycle ports and errors
//! - `infrastructure` - event bus, containers, configuration and logging
//! - `demo` - a small host scene exercising the whole stack

/// Domain layer - keys, lifetimes, filters and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use scenedi_domain::*;
}

/// Infrastructure layer - event bus, DI containers, config and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use scenedi_infrastructure::*;
}

pub mod demo;

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export the demo entry point at the crate root
pub use demo::{DemoSummary, run_demo};
