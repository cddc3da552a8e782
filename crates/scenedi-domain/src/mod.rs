//! # Domain Layer
//!
//! Pure types shared by every part of scenedi. Nothing here touches the
//! event bus or a container; those live in `scenedi-infrastructure`.
//!
//! ## Module Categories
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error taxonomy and `Result` alias |
//! | [`value_objects`] | Dependency keys, lifetimes, live-instance filters |
//! | [`events`] | Lifecycle event kinds and payloads |
//! | [`ports`] | Lifecycle objects, injection slots, component locator |

pub mod error;
pub mod events;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use events::{LifecycleEvent, LifecycleEventKind};
pub use ports::{
    ComponentLocator, EngineManaged, FilterSlot, Injectable, Injected, Instance, LifecycleObject,
    ObjectRef, ObjectRefExt, SlotInfo, SlotKind, SlotTable,
};
pub use value_objects::{AnyFilter, DependencyKey, Filter, Lifetime};
