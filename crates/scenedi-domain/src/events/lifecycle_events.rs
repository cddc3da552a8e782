//! Lifecycle event definitions

use crate::ports::lifecycle::ObjectRef;
use crate::value_objects::DependencyKey;
use std::fmt;

/// The two transitions a lifecycle object reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEventKind {
    /// The object became active (constructed, or enabled by the host)
    Created,
    /// The object became inactive (released, or disabled by the host)
    Destroyed,
}

impl LifecycleEventKind {
    /// Short lowercase name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for LifecycleEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle transition of one object
#[derive(Clone)]
pub struct LifecycleEvent {
    /// Which transition happened
    pub kind: LifecycleEventKind,
    /// The object that changed state
    pub instance: ObjectRef,
    /// Type used as dependency and filter key for the object
    pub declared_type: DependencyKey,
}

impl LifecycleEvent {
    /// Create event for `instance`, keyed by its own declared type
    pub fn created(instance: ObjectRef) -> Self {
        let declared_type = instance.declared_type();
        Self {
            kind: LifecycleEventKind::Created,
            instance,
            declared_type,
        }
    }

    /// Destroy event for `instance`, keyed by its own declared type
    pub fn destroyed(instance: ObjectRef) -> Self {
        let declared_type = instance.declared_type();
        Self {
            kind: LifecycleEventKind::Destroyed,
            instance,
            declared_type,
        }
    }
}

impl fmt::Debug for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleEvent")
            .field("kind", &self.kind)
            .field("declared_type", &self.declared_type)
            .finish_non_exhaustive()
    }
}
