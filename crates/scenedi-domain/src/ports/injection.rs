//! Injectable slots
//!
//! Instead of discovering marked fields at runtime, each type lists its
//! injectable slots once in a [`SlotTable`]. Slots are matched by their
//! declared value type; the name is only used to address the slot and in
//! diagnostics.
//!
//! ```
//! use scenedi_domain::{FilterSlot, Injectable, Injected, SlotTable};
//!
//! struct Logger;
//! struct Enemy;
//!
//! #[derive(Default)]
//! struct Spawner {
//!     logger: Injected<Logger>,
//!     enemies: FilterSlot<Enemy>,
//! }
//!
//! impl Injectable for Spawner {
//!     fn slot_table() -> SlotTable<Self> {
//!         SlotTable::new()
//!             .dependency("logger", |s: &Self| &s.logger)
//!             .filter("enemies", |s: &Self| &s.enemies)
//!     }
//! }
//! ```

use crate::error::{Error, Result};
use crate::ports::lifecycle::{Instance, LifecycleObject};
use crate::value_objects::{DependencyKey, Filter};
use std::any::type_name;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A slot the container fills with a value of type `T`
pub struct Injected<T> {
    value: RwLock<Option<Arc<T>>>,
}

impl<T: Send + Sync + 'static> Injected<T> {
    /// An empty slot
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }

    /// A slot that already holds `value`
    pub fn with_value(value: Arc<T>) -> Self {
        Self {
            value: RwLock::new(Some(value)),
        }
    }

    /// Current value, if injected
    pub fn get(&self) -> Option<Arc<T>> {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the slot holds a value
    pub fn is_set(&self) -> bool {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the slot's value
    pub fn set(&self, value: Arc<T>) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    /// Empty the slot, returning what it held
    pub fn clear(&self) -> Option<Arc<T>> {
        self.value
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<T: Send + Sync + 'static> Default for Injected<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for Injected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injected")
            .field("type", &type_name::<T>())
            .field("set", &self.is_set())
            .finish()
    }
}

/// Slot receiving the container's [`Filter`] for `E`
pub type FilterSlot<E> = Injected<Filter<E>>;

/// What a slot expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A dependency resolved through the descriptor tables
    Dependency(DependencyKey),
    /// A live-instance filter for the given element type (local only)
    Filter(DependencyKey),
}

impl SlotKind {
    /// The dependency type, or the filter's element type
    pub fn key(&self) -> DependencyKey {
        match self {
            Self::Dependency(key) | Self::Filter(key) => *key,
        }
    }
}

/// Name and kind of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo {
    /// Slot name, unique within its type
    pub name: &'static str,
    /// What the slot expects
    pub kind: SlotKind,
}

type SlotProbe<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type SlotWriter<T> = Box<dyn Fn(&T, Instance) -> Result<()> + Send + Sync>;

struct SlotEntry<T> {
    info: SlotInfo,
    is_set: SlotProbe<T>,
    assign: SlotWriter<T>,
}

/// Ordered injectable slots of `T`
pub struct SlotTable<T> {
    entries: Vec<SlotEntry<T>>,
}

impl<T: 'static> SlotTable<T> {
    /// An empty table
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Declare a dependency slot of type `D`
    pub fn dependency<D: Send + Sync + 'static>(
        self,
        name: &'static str,
        accessor: fn(&T) -> &Injected<D>,
    ) -> Self {
        self.push(name, SlotKind::Dependency(DependencyKey::of::<D>()), accessor)
    }

    /// Declare a filter slot for element type `E`
    pub fn filter<E: Send + Sync + 'static>(
        self,
        name: &'static str,
        accessor: fn(&T) -> &FilterSlot<E>,
    ) -> Self {
        self.push(name, SlotKind::Filter(DependencyKey::of::<E>()), accessor)
    }

    fn push<D: Send + Sync + 'static>(
        mut self,
        name: &'static str,
        kind: SlotKind,
        accessor: fn(&T) -> &Injected<D>,
    ) -> Self {
        self.entries.push(SlotEntry {
            info: SlotInfo { name, kind },
            is_set: Box::new(move |target: &T| accessor(target).is_set()),
            assign: Box::new(move |target: &T, value: Instance| {
                let typed = value.downcast::<D>().map_err(|_| {
                    Error::type_mismatch(type_name::<D>(), format!("value for slot '{name}'"))
                })?;
                accessor(target).set(typed);
                Ok(())
            }),
        });
        self
    }

    /// Slot descriptions in declaration order
    pub fn slots(&self) -> Vec<SlotInfo> {
        self.entries.iter().map(|entry| entry.info).collect()
    }

    /// Number of declared slots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the type declares no slots
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the named slot of `target` holds a value; unknown names are unset
    pub fn is_set(&self, target: &T, name: &str) -> bool {
        self.entry(name)
            .is_some_and(|entry| (entry.is_set)(target))
    }

    /// Store `value` into the named slot of `target`
    pub fn assign(&self, target: &T, name: &str, value: Instance) -> Result<()> {
        let entry = self.entry(name).ok_or_else(|| {
            Error::not_found(format!("slot '{name}' on {}", type_name::<T>()))
        })?;
        (entry.assign)(target, value)
    }

    fn entry(&self, name: &str) -> Option<&SlotEntry<T>> {
        self.entries.iter().find(|entry| entry.info.name == name)
    }
}

impl<T: 'static> Default for SlotTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A type that takes part in injection.
///
/// Implementing this trait (usually just `slot_table`) is enough to make the
/// type a [`LifecycleObject`].
pub trait Injectable: Send + Sync + Sized + 'static {
    /// The type's injectable slots, in declaration order
    fn slot_table() -> SlotTable<Self> {
        SlotTable::new()
    }
}

impl<T: Injectable> LifecycleObject for T {
    fn declared_type(&self) -> DependencyKey {
        DependencyKey::of::<T>()
    }

    fn injected_slots(&self) -> Vec<SlotInfo> {
        T::slot_table().slots()
    }

    fn is_slot_set(&self, slot: &str) -> bool {
        T::slot_table().is_set(self, slot)
    }

    fn assign_slot(&self, slot: &str, value: Instance) -> Result<()> {
        T::slot_table().assign(self, slot, value)
    }

    fn into_any(self: Arc<Self>) -> Instance {
        self
    }
}
