//! Lifecycle object port
//!
//! A lifecycle object is any value that takes part in injection. It is
//! shared as an [`ObjectRef`] and must announce itself on the event bus when
//! it becomes active and inactive. Types normally get this trait through the
//! blanket implementation for [`Injectable`](crate::ports::Injectable).

use crate::error::Result;
use crate::ports::injection::SlotInfo;
use crate::value_objects::DependencyKey;
use std::any::Any;
use std::sync::Arc;

/// Type-erased value produced by a factory or stored in a slot
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Shared handle to a lifecycle object
pub type ObjectRef = Arc<dyn LifecycleObject>;

/// An object the container can inject into
pub trait LifecycleObject: Send + Sync + 'static {
    /// Type used as the dependency key and the filter key
    fn declared_type(&self) -> DependencyKey;

    /// Human readable type name
    fn type_name(&self) -> &'static str {
        self.declared_type().type_name()
    }

    /// Ordered injectable slots declared by the type
    fn injected_slots(&self) -> Vec<SlotInfo>;

    /// Whether the named slot currently holds a value
    fn is_slot_set(&self, slot: &str) -> bool;

    /// Store `value` in the named slot
    fn assign_slot(&self, slot: &str, value: Instance) -> Result<()>;

    /// Upcast for downcasting to the concrete type
    fn into_any(self: Arc<Self>) -> Instance;
}

/// Helpers on [`ObjectRef`]
pub trait ObjectRefExt {
    /// Concrete `Arc<T>` if the object is a `T`
    fn downcast_arc<T: Send + Sync + 'static>(&self) -> Option<Arc<T>>;

    /// Identity comparison
    fn same_object(&self, other: &ObjectRef) -> bool;
}

impl ObjectRefExt for ObjectRef {
    fn downcast_arc<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(self).into_any().downcast::<T>().ok()
    }

    fn same_object(&self, other: &ObjectRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(self), Arc::as_ptr(other))
    }
}

/// A value owned by the host engine rather than by Rust ownership alone.
///
/// When a shared value of such a type loses its last reference, the
/// container asks the host to destroy it, and to destroy the carrier object
/// too if nothing else lives there.
pub trait EngineManaged: Send + Sync {
    /// Ask the host to destroy this object
    fn request_destroy(&self);

    /// Whether this is the only user component on its carrier
    fn is_sole_component(&self) -> bool {
        false
    }

    /// Ask the host to destroy the carrier object
    fn request_carrier_destroy(&self) {}
}
