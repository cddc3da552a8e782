//! Enable/disable lifecycle for engine-managed objects
//!
//! Objects owned by the host engine are not created and dropped by the
//! scripting layer; the host enables and disables them, possibly several
//! times. `LifecycleSwitch` turns those transitions into lifecycle events and
//! ignores repeated calls, so each create event is emitted once per
//! activation.

use crate::events::bus::EventBus;
use scenedi_domain::ObjectRef;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Hook = Arc<dyn Fn(&ObjectRef) + Send + Sync>;

/// Tracks whether a host object is currently enabled
pub struct LifecycleSwitch {
    object: ObjectRef,
    bus: EventBus,
    enabled: AtomicBool,
    on_enabled: Option<Hook>,
    on_disabled: Option<Hook>,
}

impl LifecycleSwitch {
    /// A disabled switch for `object`
    pub fn new(bus: &EventBus, object: ObjectRef) -> Self {
        Self {
            object,
            bus: bus.clone(),
            enabled: AtomicBool::new(false),
            on_enabled: None,
            on_disabled: None,
        }
    }

    /// Run `hook` after each create event
    pub fn with_on_enabled<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ObjectRef) + Send + Sync + 'static,
    {
        self.on_enabled = Some(Arc::new(hook));
        self
    }

    /// Run `hook` after each destroy event
    pub fn with_on_disabled<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ObjectRef) + Send + Sync + 'static,
    {
        self.on_disabled = Some(Arc::new(hook));
        self
    }

    /// Enable the object; emits a create event on a disabled -> enabled
    /// transition and returns whether one happened
    pub fn enable(&self) -> bool {
        if self.enabled.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.bus.emit_create(&self.object);
        if let Some(hook) = &self.on_enabled {
            hook(&self.object);
        }
        true
    }

    /// Disable the object; emits a destroy event on an enabled -> disabled
    /// transition and returns whether one happened
    pub fn disable(&self) -> bool {
        if !self.enabled.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.bus.emit_destroy(&self.object);
        if let Some(hook) = &self.on_disabled {
            hook(&self.object);
        }
        true
    }

    /// Whether the object is currently enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// The switched object
    pub fn object(&self) -> &ObjectRef {
        &self.object
    }
}

impl fmt::Debug for LifecycleSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleSwitch")
            .field("type", &self.object.type_name())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
