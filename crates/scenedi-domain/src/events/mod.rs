//! Lifecycle Events
//!
//! Every object taking part in dependency injection announces two facts about
//! itself: it became active, and it became inactive. Containers react to
//! these facts; nothing else flows over the bus.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`LifecycleEventKind`] | Created / Destroyed |
//! | [`LifecycleEvent`] | Kind plus the object and its declared type |

/// Lifecycle event definitions
pub mod lifecycle_events;

pub use lifecycle_events::{LifecycleEvent, LifecycleEventKind};
