//! Dependency descriptors
//!
//! One descriptor per registered type: its lifetime, the shared reference
//! count, the cached value and the factory.
//!
//! Resolution is split in two phases so a container can run factories
//! without holding its table lock:
//!
//! ```text
//! begin_resolve() ──► Ready(value)                  (cached / singleton)
//!                 └─► Construct(factory) ──► factory(requester)
//!                                              └─► complete_resolve(value)
//! ```

use scenedi_domain::{Error, Instance, Lifetime, ObjectRef, Result};
use std::fmt;
use std::sync::Arc;

/// Produces a value, optionally looking at the object that asked for it
pub type Factory = Arc<dyn Fn(Option<&ObjectRef>) -> Option<Instance> + Send + Sync>;

/// Runs when a shared value loses its last reference
pub type ReleaseHook = Arc<dyn Fn(&Instance) + Send + Sync>;

/// What the container must do to finish a resolution
pub enum Resolution {
    /// The value is known; no factory call needed
    Ready(Option<Instance>),
    /// Invoke the factory, then report back via `complete_resolve`
    Construct(Factory),
}

/// Outcome of dropping one shared reference
pub enum Release {
    /// References remain; carries the new count
    Retained(usize),
    /// The count reached zero and the cached value was evicted
    Released {
        /// The evicted value
        value: Instance,
        /// Host-side destruction to run for it
        hook: Option<ReleaseHook>,
    },
    /// The count reached zero with nothing cached
    Emptied,
    /// The count was already zero
    Unbalanced,
}

/// Registration record for one dependency type
pub struct DependencyDescriptor {
    lifetime: Lifetime,
    ref_count: usize,
    cached: Option<Instance>,
    factory: Option<Factory>,
    release: Option<ReleaseHook>,
}

impl DependencyDescriptor {
    /// Singleton holding an already constructed value
    pub fn singleton(value: Option<Instance>) -> Self {
        Self {
            lifetime: Lifetime::Singleton,
            ref_count: 0,
            cached: value,
            factory: None,
            release: None,
        }
    }

    /// Transient backed by `factory`
    pub fn transient(factory: Factory) -> Self {
        Self {
            lifetime: Lifetime::Transient,
            ref_count: 0,
            cached: None,
            factory: Some(factory),
            release: None,
        }
    }

    /// Shared backed by `factory`, with an optional release hook
    pub fn shared(factory: Factory, release: Option<ReleaseHook>) -> Self {
        Self {
            lifetime: Lifetime::Shared,
            ref_count: 0,
            cached: None,
            factory: Some(factory),
            release,
        }
    }

    /// Lifetime policy
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Outstanding shared references (always zero for other lifetimes)
    pub fn ref_count(&self) -> usize {
        self.ref_count
    }

    /// Cached value, if any
    pub fn cached(&self) -> Option<&Instance> {
        self.cached.as_ref()
    }

    /// First phase of a resolution.
    ///
    /// Shared descriptors count the reference here, whether or not the
    /// factory later produces a value.
    pub fn begin_resolve(&mut self) -> Result<Resolution> {
        match self.lifetime {
            Lifetime::Singleton => Ok(Resolution::Ready(self.cached.clone())),
            Lifetime::Transient => Ok(self.construct()),
            Lifetime::Shared => {
                let first = self.ref_count == 0;
                self.ref_count += 1;
                if first {
                    Ok(self.construct())
                } else {
                    Ok(Resolution::Ready(self.cached.clone()))
                }
            }
            other => Err(Error::unknown_lifetime(format!("{other:?}"))),
        }
    }

    /// Second phase: record what the factory produced
    pub fn complete_resolve(&mut self, value: Option<&Instance>) {
        if self.lifetime == Lifetime::Shared && self.ref_count > 0 && self.cached.is_none() {
            self.cached = value.cloned();
        }
    }

    /// Resolve in one step, invoking the factory inline
    pub fn resolve(&mut self, requester: Option<&ObjectRef>) -> Result<Option<Instance>> {
        match self.begin_resolve()? {
            Resolution::Ready(value) => Ok(value),
            Resolution::Construct(factory) => {
                let value = factory(requester);
                self.complete_resolve(value.as_ref());
                Ok(value)
            }
        }
    }

    /// Drop one shared reference.
    ///
    /// Non-shared descriptors are never counted and report `Retained(0)`.
    pub fn release(&mut self) -> Release {
        if self.lifetime != Lifetime::Shared {
            return Release::Retained(0);
        }
        if self.ref_count == 0 {
            return Release::Unbalanced;
        }
        self.ref_count -= 1;
        if self.ref_count > 0 {
            return Release::Retained(self.ref_count);
        }
        match self.cached.take() {
            Some(value) => Release::Released {
                value,
                hook: self.release.clone(),
            },
            None => Release::Emptied,
        }
    }

    fn construct(&self) -> Resolution {
        match &self.factory {
            Some(factory) => Resolution::Construct(Arc::clone(factory)),
            None => Resolution::Ready(None),
        }
    }
}

impl fmt::Debug for DependencyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyDescriptor")
            .field("lifetime", &self.lifetime)
            .field("ref_count", &self.ref_count)
            .field("cached", &self.cached.is_some())
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

/// Read-only summary of a descriptor for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSummary {
    /// Registered type name
    pub type_name: &'static str,
    /// Lifetime policy
    pub lifetime: Lifetime,
    /// Outstanding shared references
    pub ref_count: usize,
    /// Whether a value is cached
    pub cached: bool,
}
