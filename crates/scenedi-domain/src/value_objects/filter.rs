//! Live-instance filters
//!
//! A [`Filter<E>`] holds every currently active object of type `E`, in the
//! order their create events arrived. Membership is maintained by the owning
//! container reacting to lifecycle events.
//!
//! ## Reading while the bus dispatches
//!
//! `len`/`get`/`contains` read the live collection. `iter` and `snapshot`
//! copy the current members first, so callers may destroy members (and
//! thereby emit destroy events that shrink the filter) while walking the
//! copy.

use crate::error::{Error, Result};
use crate::ports::lifecycle::{Instance, ObjectRef, ObjectRefExt};
use crate::value_objects::key::DependencyKey;
use std::any::type_name;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Ordered set of live instances of `E`
pub struct Filter<E> {
    items: RwLock<Vec<Arc<E>>>,
}

impl<E: Send + Sync + 'static> Filter<E> {
    /// Create an empty filter
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    /// Add a lifecycle object, failing with `TypeMismatch` if it is not an `E`
    pub fn add(&self, obj: &ObjectRef) -> Result<()> {
        let item = Self::cast(obj)?;
        self.insert(item);
        Ok(())
    }

    /// Remove a lifecycle object, failing with `TypeMismatch` if it is not an `E`.
    ///
    /// Returns whether the object was a member.
    pub fn remove(&self, obj: &ObjectRef) -> Result<bool> {
        let item = Self::cast(obj)?;
        Ok(self.take(&item))
    }

    /// Append an instance unless it is already a member
    pub fn insert(&self, item: Arc<E>) -> bool {
        let mut items = self.write();
        if items.iter().any(|existing| Arc::ptr_eq(existing, &item)) {
            return false;
        }
        items.push(item);
        true
    }

    /// Remove the matching instance, preserving the order of the rest
    pub fn take(&self, item: &Arc<E>) -> bool {
        let mut items = self.write();
        match items.iter().position(|existing| Arc::ptr_eq(existing, item)) {
            Some(idx) => {
                items.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Number of live members
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the filter has no members
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Member at `index`, in creation order
    pub fn get(&self, index: usize) -> Option<Arc<E>> {
        self.read().get(index).cloned()
    }

    /// Whether `item` is a member
    pub fn contains(&self, item: &Arc<E>) -> bool {
        self.read().iter().any(|existing| Arc::ptr_eq(existing, item))
    }

    /// Copy of the current members
    pub fn snapshot(&self) -> Vec<Arc<E>> {
        self.read().clone()
    }

    /// Iterate over a snapshot of the current members
    pub fn iter(&self) -> std::vec::IntoIter<Arc<E>> {
        self.snapshot().into_iter()
    }

    fn cast(obj: &ObjectRef) -> Result<Arc<E>> {
        obj.downcast_arc::<E>()
            .ok_or_else(|| Error::type_mismatch(type_name::<E>(), obj.type_name()))
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<E>>> {
        self.items.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<E>>> {
        self.items.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: Send + Sync + 'static> Default for Filter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Send + Sync + 'static> fmt::Debug for Filter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("element", &type_name::<E>())
            .field("len", &self.len())
            .finish()
    }
}

/// Type-erased view of a [`Filter`], as stored in a container's filter table
pub trait AnyFilter: Send + Sync {
    /// Key of the element type
    fn element_key(&self) -> DependencyKey;

    /// See [`Filter::add`]
    fn add_object(&self, obj: &ObjectRef) -> Result<()>;

    /// See [`Filter::remove`]
    fn remove_object(&self, obj: &ObjectRef) -> Result<bool>;

    /// Number of live members
    fn member_count(&self) -> usize;

    /// The filter itself as an injectable value
    fn into_instance(self: Arc<Self>) -> Instance;
}

impl<E: Send + Sync + 'static> AnyFilter for Filter<E> {
    fn element_key(&self) -> DependencyKey {
        DependencyKey::of::<E>()
    }

    fn add_object(&self, obj: &ObjectRef) -> Result<()> {
        self.add(obj)
    }

    fn remove_object(&self, obj: &ObjectRef) -> Result<bool> {
        self.remove(obj)
    }

    fn member_count(&self) -> usize {
        self.len()
    }

    fn into_instance(self: Arc<Self>) -> Instance {
        self
    }
}
