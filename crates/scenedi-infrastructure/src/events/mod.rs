//! Lifecycle Event Infrastructure
//!
//! | Type | Description |
//! |------|-------------|
//! | [`EventBus`] | Synchronous create/destroy broadcast |
//! | [`Tracked`] | RAII guard for plain objects |
//! | [`LifecycleSwitch`] | Enable/disable state for engine-managed objects |

pub mod bus;
pub mod switch;
pub mod tracked;

pub use bus::{EventBus, LifecycleHandler, Rewiring, SubscriptionId};
pub use switch::LifecycleSwitch;
pub use tracked::Tracked;
