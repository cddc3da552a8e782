//! Container registration API
//!
//! Every registration is keyed by the value type `T`. Registering the same
//! key twice in one container fails with `DuplicateRegistration` and leaves
//! the container unchanged.

use crate::di::container::Container;
use crate::di::descriptor::{DependencyDescriptor, Factory, ReleaseHook};
use scenedi_domain::{
    AnyFilter, DependencyKey, EngineManaged, Error, Filter, Instance, Lifetime, ObjectRef, Result,
};
use std::sync::Arc;
use tracing::debug;

fn erase<T, F>(factory: F) -> Factory
where
    T: Send + Sync + 'static,
    F: Fn(Option<&ObjectRef>) -> Option<Arc<T>> + Send + Sync + 'static,
{
    Arc::new(move |requester: Option<&ObjectRef>| {
        factory(requester).map(|value| value as Instance)
    })
}

fn engine_release<T: EngineManaged + 'static>() -> ReleaseHook {
    Arc::new(|value: &Instance| {
        if let Some(managed) = (**value).downcast_ref::<T>() {
            // Sampled before destruction: the host may detach the value at once.
            let sole = managed.is_sole_component();
            managed.request_destroy();
            if sole {
                managed.request_carrier_destroy();
            }
        }
    })
}

impl Container {
    /// Register `T` as a singleton.
    ///
    /// The factory runs immediately with no requester; its value is cached
    /// for the life of the container and returned for convenience.
    pub fn register_singleton<T, F>(&self, factory: F) -> Result<Option<Arc<T>>>
    where
        T: Send + Sync + 'static,
        F: FnOnce(Option<&ObjectRef>) -> Option<Arc<T>>,
    {
        let key = DependencyKey::of::<T>();
        self.ensure_unregistered(key)?;
        let value = factory(None);
        let instance = value.clone().map(|value| value as Instance);
        self.insert_descriptor(key, DependencyDescriptor::singleton(instance))?;
        Ok(value)
    }

    /// Register `T` as transient: the factory runs on every resolution with
    /// the requesting object
    pub fn register_transient<T, F>(&self, factory: F) -> Result<()>
    where
        T: Send + Sync + 'static,
        F: Fn(Option<&ObjectRef>) -> Option<Arc<T>> + Send + Sync + 'static,
    {
        self.insert_descriptor(
            DependencyKey::of::<T>(),
            DependencyDescriptor::transient(erase(factory)),
        )
    }

    /// Register `T` as shared: constructed on first demand, cached while
    /// referenced, dropped when the last reference goes away
    pub fn register_shared<T, F>(&self, factory: F) -> Result<()>
    where
        T: Send + Sync + 'static,
        F: Fn(Option<&ObjectRef>) -> Option<Arc<T>> + Send + Sync + 'static,
    {
        self.insert_descriptor(
            DependencyKey::of::<T>(),
            DependencyDescriptor::shared(erase(factory), None),
        )
    }

    /// Like [`register_shared`](Self::register_shared) for host-owned
    /// values: releasing the last reference asks the host to destroy the
    /// value, and its carrier if the value was alone there
    pub fn register_shared_managed<T, F>(&self, factory: F) -> Result<()>
    where
        T: EngineManaged + 'static,
        F: Fn(Option<&ObjectRef>) -> Option<Arc<T>> + Send + Sync + 'static,
    {
        self.insert_descriptor(
            DependencyKey::of::<T>(),
            DependencyDescriptor::shared(erase(factory), Some(engine_release::<T>())),
        )
    }

    /// Register `T` with a lifetime chosen at runtime.
    ///
    /// Returns the constructed value for singletons, `None` otherwise.
    pub fn register<T, F>(&self, lifetime: Lifetime, factory: F) -> Result<Option<Arc<T>>>
    where
        T: Send + Sync + 'static,
        F: Fn(Option<&ObjectRef>) -> Option<Arc<T>> + Send + Sync + 'static,
    {
        match lifetime {
            Lifetime::Singleton => self.register_singleton(factory),
            Lifetime::Transient => self.register_transient(factory).map(|()| None),
            Lifetime::Shared => self.register_shared(factory).map(|()| None),
            other => Err(Error::unknown_lifetime(format!("{other:?}"))),
        }
    }

    /// Install an empty live-instance filter for `E`
    pub fn register_filter<E: Send + Sync + 'static>(&self) -> Result<Arc<Filter<E>>> {
        let key = DependencyKey::of::<E>();
        let filter = Arc::new(Filter::<E>::new());
        {
            let mut guard = self.state.write_tables();
            let tables = guard.as_mut().ok_or_else(|| self.destroyed_error())?;
            if tables.filters.contains_key(&key) {
                return Err(Error::duplicate_registration(format!(
                    "Filter<{}>",
                    key.short_name()
                )));
            }
            tables
                .filters
                .insert(key, Arc::clone(&filter) as Arc<dyn AnyFilter>);
        }
        debug!(container = %self.name(), element = key.short_name(), "Filter registered");
        Ok(filter)
    }

    fn ensure_unregistered(&self, key: DependencyKey) -> Result<()> {
        let guard = self.state.read_tables();
        let tables = guard.as_ref().ok_or_else(|| self.destroyed_error())?;
        if tables.descriptors.contains_key(&key) {
            return Err(Error::duplicate_registration(key.short_name()));
        }
        Ok(())
    }

    fn insert_descriptor(
        &self,
        key: DependencyKey,
        descriptor: DependencyDescriptor,
    ) -> Result<()> {
        let lifetime = descriptor.lifetime();
        {
            let mut guard = self.state.write_tables();
            let tables = guard.as_mut().ok_or_else(|| self.destroyed_error())?;
            if tables.descriptors.contains_key(&key) {
                return Err(Error::duplicate_registration(key.short_name()));
            }
            tables.descriptors.insert(key, descriptor);
        }
        debug!(
            container = %self.name(),
            dependency = key.short_name(),
            lifetime = %lifetime,
            "Dependency registered"
        );
        Ok(())
    }
}
