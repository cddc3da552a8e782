//! Lifecycle guard for plain objects
//!
//! A plain object is active from construction until it is dropped. `Tracked`
//! emits the create event when it is built and the destroy event exactly once,
//! either on [`Tracked::finish`] or when the guard is dropped. Drop timing in
//! Rust is deterministic, so shared references are released at a known point.

use crate::events::bus::EventBus;
use scenedi_domain::{LifecycleObject, ObjectRef};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Owns the active period of a lifecycle object
pub struct Tracked<T: LifecycleObject> {
    object: Arc<T>,
    bus: EventBus,
    active: bool,
}

impl<T: LifecycleObject> Tracked<T> {
    /// Wrap `object` and emit its create event
    pub fn new(bus: &EventBus, object: T) -> Self {
        Self::from_arc(bus, Arc::new(object))
    }

    /// Like [`new`](Self::new) for an object that is already shared
    pub fn from_arc(bus: &EventBus, object: Arc<T>) -> Self {
        let erased: ObjectRef = object.clone();
        bus.emit_create(&erased);
        Self {
            object,
            bus: bus.clone(),
            active: true,
        }
    }

    /// The tracked object
    pub fn object(&self) -> &Arc<T> {
        &self.object
    }

    /// The tracked object as a lifecycle handle
    pub fn as_object_ref(&self) -> ObjectRef {
        self.object.clone()
    }

    /// Emit the destroy event now and hand back the object
    pub fn finish(mut self) -> Arc<T> {
        self.release();
        Arc::clone(&self.object)
    }

    fn release(&mut self) {
        if self.active {
            self.active = false;
            let erased: ObjectRef = self.object.clone();
            self.bus.emit_destroy(&erased);
        }
    }
}

impl<T: LifecycleObject> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.object
    }
}

impl<T: LifecycleObject> Drop for Tracked<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: LifecycleObject> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("type", &self.object.type_name())
            .field("active", &self.active)
            .finish()
    }
}
