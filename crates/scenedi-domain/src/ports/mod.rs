//! Domain Ports
//!
//! Contracts between the container and the objects it serves.
//!
//! | Port | Description |
//! |------|-------------|
//! | [`LifecycleObject`] | Anything that emits create/destroy events |
//! | [`Injectable`] | Explicit per-type table of injectable slots |
//! | [`EngineManaged`] | Values whose release must go through the host |
//! | [`ComponentLocator`] | "Find a component here or below" queries |

pub mod injection;
pub mod lifecycle;
pub mod locator;

pub use injection::{FilterSlot, Injectable, Injected, SlotInfo, SlotKind, SlotTable};
pub use lifecycle::{EngineManaged, Instance, LifecycleObject, ObjectRef, ObjectRefExt};
pub use locator::ComponentLocator;
