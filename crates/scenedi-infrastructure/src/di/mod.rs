//! Dependency Injection
//!
//! Lifecycle-driven injection: containers subscribe to the event bus and fill
//! the slots of every object that announces itself.
//!
//! ```text
//! object enabled ──► EventBus::emit_create ──► Container::inject
//!                                          └─► Filter<T> insert
//! object disabled ─► EventBus::emit_destroy ─► Container::dispose_shared
//!                                          └─► Filter<T> removal
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`descriptor`] | Per-type lifetime, count, cache, factory |
//! | [`container`] | Tables, bus subscriptions, parent chain, teardown |
//! | [`registration`] | `register_*` API |
//! | [`injection`] | Resolution, injection, shared disposal |

pub mod container;
pub mod descriptor;
pub mod injection;
pub mod registration;

pub use container::{Container, ContainerBuilder};
pub use descriptor::{
    DependencyDescriptor, DescriptorSummary, Factory, Release, ReleaseHook, Resolution,
};
pub use injection::InjectionReport;
