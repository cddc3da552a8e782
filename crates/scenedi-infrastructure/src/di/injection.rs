//! Resolution, injection and shared disposal

use crate::di::container::Container;
use crate::di::descriptor::{Release, Resolution};
use scenedi_domain::{DependencyKey, Error, Instance, Lifetime, ObjectRef, Result, SlotKind};
use std::sync::Arc;
use tracing::{debug, warn};

/// What one injection pass did
#[derive(Debug, Default)]
pub struct InjectionReport {
    /// Dependency slots that received a value
    pub resolved: Vec<&'static str>,
    /// Filter slots that received a filter
    pub filters: Vec<&'static str>,
    /// Dependency slots left unset
    pub unresolved: Vec<Error>,
}

impl InjectionReport {
    /// Whether every dependency slot was filled
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

impl Container {
    /// Fill the injectable slots of `target`.
    ///
    /// - Empty filter slots get this container's filter for the element type.
    ///   Filters never come from a parent.
    /// - Dependency slots are resolved here first, then in each parent in
    ///   turn. A miss everywhere is logged and reported, not returned as an
    ///   error; the slot stays unset.
    ///
    /// Every call resolves again: transient factories run again and shared
    /// counts go up again. Run it once per create event.
    pub fn inject(
        &self,
        target: &ObjectRef,
        declared_type: DependencyKey,
    ) -> Result<InjectionReport> {
        let mut report = InjectionReport::default();

        for slot in target.injected_slots() {
            match slot.kind {
                SlotKind::Filter(element) => {
                    if target.is_slot_set(slot.name) {
                        continue;
                    }
                    if let Some(filter) = self.filter_for(element) {
                        target.assign_slot(slot.name, filter.into_instance())?;
                        report.filters.push(slot.name);
                    }
                }
                SlotKind::Dependency(dependency) => {
                    match self.resolve_in_chain(Some(target), dependency)? {
                        Some(value) => {
                            target.assign_slot(slot.name, value)?;
                            report.resolved.push(slot.name);
                        }
                        None => {
                            let missing = Error::unresolved(
                                declared_type.type_name(),
                                slot.name,
                                dependency.type_name(),
                            );
                            warn!(container = %self.name(), "{missing}");
                            report.unresolved.push(missing);
                        }
                    }
                }
            }
        }

        debug!(
            container = %self.name(),
            target = declared_type.short_name(),
            resolved = report.resolved.len(),
            filters = report.filters.len(),
            unresolved = report.unresolved.len(),
            "Injection complete"
        );
        Ok(report)
    }

    /// Drop the shared references held by `target`.
    ///
    /// For each dependency slot whose type is a local shared registration,
    /// the count goes down by one. A value whose count reaches zero is
    /// evicted, and host-owned values are handed back to the host for
    /// destruction. Returns the number of evicted values.
    pub fn dispose_shared(&self, target: &ObjectRef, declared_type: DependencyKey) -> usize {
        let mut evicted = Vec::new();
        {
            let mut guard = self.state.write_tables();
            let Some(tables) = guard.as_mut() else {
                return 0;
            };
            for slot in target.injected_slots() {
                let SlotKind::Dependency(dependency) = slot.kind else {
                    continue;
                };
                let Some(descriptor) = tables.descriptors.get_mut(&dependency) else {
                    continue;
                };
                if descriptor.lifetime() != Lifetime::Shared {
                    continue;
                }
                match descriptor.release() {
                    Release::Retained(remaining) => debug!(
                        container = %self.name(),
                        dependency = dependency.short_name(),
                        remaining,
                        "Shared reference dropped"
                    ),
                    Release::Released { value, hook } => evicted.push((dependency, value, hook)),
                    Release::Emptied => debug!(
                        container = %self.name(),
                        dependency = dependency.short_name(),
                        "Shared references exhausted with nothing cached"
                    ),
                    Release::Unbalanced => warn!(
                        container = %self.name(),
                        dependency = dependency.short_name(),
                        target = declared_type.short_name(),
                        "Shared release without a matching resolution"
                    ),
                }
            }
        }

        let count = evicted.len();
        for (dependency, value, hook) in evicted {
            if let Some(hook) = hook {
                hook(&value);
            }
            debug!(
                container = %self.name(),
                dependency = dependency.short_name(),
                "Shared dependency released"
            );
        }
        count
    }

    /// Resolve `T` through this container and its parents.
    ///
    /// Shared resolutions count as a reference; pair them with
    /// [`release_shared`](Self::release_shared).
    pub fn resolve<T: Send + Sync + 'static>(
        &self,
        requester: Option<&ObjectRef>,
    ) -> Result<Arc<T>> {
        let key = DependencyKey::of::<T>();
        let value = self.resolve_in_chain(requester, key)?.ok_or_else(|| {
            Error::unresolved(
                requester.map_or("<direct>", |r| r.type_name()),
                "<direct>",
                key.type_name(),
            )
        })?;
        value
            .downcast::<T>()
            .map_err(|_| Error::type_mismatch(key.type_name(), "resolved value"))
    }

    /// Drop one shared reference to `T` in the nearest container that
    /// registers it. Returns whether such a container was found.
    pub fn release_shared<T: Send + Sync + 'static>(&self) -> Result<bool> {
        let key = DependencyKey::of::<T>();
        let mut current = Some(self.clone());
        while let Some(container) = current {
            let outcome = {
                let mut guard = container.state.write_tables();
                guard
                    .as_mut()
                    .and_then(|tables| tables.descriptors.get_mut(&key))
                    .map(|descriptor| (descriptor.lifetime(), descriptor.release()))
            };
            match outcome {
                Some((Lifetime::Shared, Release::Released { value, hook })) => {
                    if let Some(hook) = hook {
                        hook(&value);
                    }
                    return Ok(true);
                }
                Some((_, Release::Unbalanced)) => {
                    warn!(
                        container = %container.name(),
                        dependency = key.short_name(),
                        "Shared release without a matching resolution"
                    );
                    return Ok(true);
                }
                Some(_) => return Ok(true),
                None => current = container.parent().cloned(),
            }
        }
        Ok(false)
    }

    /// Walk this container and its parents until one yields a value
    pub fn resolve_in_chain(
        &self,
        requester: Option<&ObjectRef>,
        key: DependencyKey,
    ) -> Result<Option<Instance>> {
        let mut current = Some(self.clone());
        while let Some(container) = current {
            if let Some(value) = container.resolve_local(requester, key)? {
                return Ok(Some(value));
            }
            current = container.parent().cloned();
        }
        Ok(None)
    }

    /// Resolve against the local descriptor table only.
    ///
    /// `None` when `key` is not registered here, or when its factory
    /// produced nothing; either way the caller moves on to the parent.
    pub fn resolve_local(
        &self,
        requester: Option<&ObjectRef>,
        key: DependencyKey,
    ) -> Result<Option<Instance>> {
        let resolution = {
            let mut guard = self.state.write_tables();
            let Some(descriptor) = guard
                .as_mut()
                .and_then(|tables| tables.descriptors.get_mut(&key))
            else {
                return Ok(None);
            };
            descriptor.begin_resolve()?
        };

        match resolution {
            Resolution::Ready(value) => Ok(value),
            Resolution::Construct(factory) => {
                let value = factory(requester);
                let mut guard = self.state.write_tables();
                if let Some(descriptor) = guard
                    .as_mut()
                    .and_then(|tables| tables.descriptors.get_mut(&key))
                {
                    descriptor.complete_resolve(value.as_ref());
                }
                debug!(
                    container = %self.name(),
                    dependency = key.short_name(),
                    produced = value.is_some(),
                    "Factory invoked"
                );
                Ok(value)
            }
        }
    }
}
