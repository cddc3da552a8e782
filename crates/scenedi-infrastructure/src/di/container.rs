//! Dependency injection container
//!
//! A container owns a descriptor table and a filter table and listens to the
//! event bus:
//!
//! | Event | Handler | Effect |
//! |-------|---------|--------|
//! | created | injector | fill the object's slots |
//! | created | filter maintenance | add the object to `Filter<declared type>` |
//! | destroyed | shared disposal | drop the object's shared references |
//! | destroyed | filter maintenance | remove the object from its filter |
//!
//! ## Parent chains
//!
//! A child container resolves locally first and then walks up its parents.
//! While a child exists, the parent's injector is unsubscribed from the bus
//! so each create event is injected once, by the child. Only the injector is
//! detached; the parent keeps maintaining its filters and shared counts.
//!
//! Consequence: only one child per parent can be active. Building a second
//! child while the first is alive logs a warning, and the parent's injector
//! comes back as soon as either child is torn down.
//!
//! ## Teardown
//!
//! [`Container::destroy`] (or dropping the last handle) clears both tables,
//! unsubscribes all handlers and resubscribes the parent's injector. Values
//! already injected stay where they are.
//!
//! Building a child and tearing it down each change the bus subscriptions in
//! one [`EventBus::rewire`] batch, so an event emitted from another thread is
//! injected by the parent or by the child, never by neither.

use crate::constants::DEFAULT_CONTAINER_NAME;
use crate::di::descriptor::{DependencyDescriptor, DescriptorSummary};
use crate::events::{EventBus, LifecycleHandler, Rewiring, SubscriptionId};
use scenedi_domain::{
    AnyFilter, DependencyKey, Error, Filter, LifecycleEventKind, Lifetime, ObjectRef, Result,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};
use tracing::{debug, error, info, warn};

/// Descriptor and filter tables of one container
#[derive(Default)]
pub(crate) struct Tables {
    pub(crate) descriptors: HashMap<DependencyKey, DependencyDescriptor>,
    pub(crate) filters: HashMap<DependencyKey, Arc<dyn AnyFilter>>,
}

#[derive(Default)]
struct Subscriptions {
    inject: Option<SubscriptionId>,
    add_to_filter: Option<SubscriptionId>,
    dispose_shared: Option<SubscriptionId>,
    remove_from_filter: Option<SubscriptionId>,
}

pub(crate) struct ContainerState {
    name: String,
    bus: EventBus,
    parent: Option<Container>,
    tables: RwLock<Option<Tables>>,
    subscriptions: Mutex<Subscriptions>,
}

impl ContainerState {
    pub(crate) fn read_tables(&self) -> RwLockReadGuard<'_, Option<Tables>> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_tables(&self) -> RwLockWriteGuard<'_, Option<Tables>> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscriptions(&self) -> MutexGuard<'_, Subscriptions> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn detach_injector(&self, tx: &mut Rewiring<'_>) {
        let detached = self.subscriptions().inject.take();
        match detached {
            Some(id) => {
                tx.unsubscribe(LifecycleEventKind::Created, id);
                debug!(container = %self.name, "Injector detached for child container");
            }
            None => warn!(
                container = %self.name,
                "Injector already detached; another child container is active"
            ),
        }
    }

    fn attach_injector(state: &Arc<ContainerState>, tx: &mut Rewiring<'_>) {
        if state.read_tables().is_none() {
            return;
        }
        let mut subscriptions = state.subscriptions();
        if subscriptions.inject.is_none() {
            let id = tx.subscribe(LifecycleEventKind::Created, Self::injector(state));
            subscriptions.inject = Some(id);
            debug!(container = %state.name, "Injector reattached");
        }
    }

    /// Parent listening on this container's own bus
    fn parent_on_bus(&self) -> Option<&Container> {
        self.parent
            .as_ref()
            .filter(|parent| parent.state.bus.same_bus(&self.bus))
    }

    /// Parent listening on some other bus
    fn parent_off_bus(&self) -> Option<&Container> {
        self.parent
            .as_ref()
            .filter(|parent| !parent.state.bus.same_bus(&self.bus))
    }

    fn injector(state: &Arc<ContainerState>) -> LifecycleHandler {
        Self::handler(state, |container, target, declared_type| {
            if let Err(e) = container.inject(target, declared_type) {
                error!(
                    container = %container.name(),
                    target = declared_type.short_name(),
                    error = %e,
                    "Injection failed"
                );
            }
        })
    }

    fn handler<F>(state: &Arc<ContainerState>, action: F) -> LifecycleHandler
    where
        F: Fn(&Container, &ObjectRef, DependencyKey) + Send + Sync + 'static,
    {
        let weak: Weak<ContainerState> = Arc::downgrade(state);
        Arc::new(move |target: &ObjectRef, declared_type: DependencyKey| {
            if let Some(state) = weak.upgrade() {
                action(&Container { state }, target, declared_type);
            }
        })
    }

    fn subscribe_all(state: &Arc<ContainerState>, tx: &mut Rewiring<'_>) {
        let inject = tx.subscribe(LifecycleEventKind::Created, Self::injector(state));
        let add_to_filter = tx.subscribe(
            LifecycleEventKind::Created,
            Self::handler(state, |container, target, declared_type| {
                if let Err(e) = container.add_to_filter(target, declared_type) {
                    error!(container = %container.name(), error = %e, "Filter insert failed");
                }
            }),
        );
        let dispose_shared = tx.subscribe(
            LifecycleEventKind::Destroyed,
            Self::handler(state, |container, target, declared_type| {
                container.dispose_shared(target, declared_type);
            }),
        );
        let remove_from_filter = tx.subscribe(
            LifecycleEventKind::Destroyed,
            Self::handler(state, |container, target, declared_type| {
                if let Err(e) = container.remove_from_filter(target, declared_type) {
                    error!(container = %container.name(), error = %e, "Filter removal failed");
                }
            }),
        );

        *state.subscriptions() = Subscriptions {
            inject: Some(inject),
            add_to_filter: Some(add_to_filter),
            dispose_shared: Some(dispose_shared),
            remove_from_filter: Some(remove_from_filter),
        };
    }

    fn teardown(&self) -> bool {
        // Unsubscribing and handing injection back to the parent is one
        // rewire, so no event falls between the two.
        let tables = self.bus.rewire(|tx| {
            let tables = self.write_tables().take()?;
            let subscriptions = std::mem::take(&mut *self.subscriptions());
            let created = [subscriptions.inject, subscriptions.add_to_filter];
            let destroyed = [subscriptions.dispose_shared, subscriptions.remove_from_filter];
            for id in created.into_iter().flatten() {
                tx.unsubscribe(LifecycleEventKind::Created, id);
            }
            for id in destroyed.into_iter().flatten() {
                tx.unsubscribe(LifecycleEventKind::Destroyed, id);
            }
            if let Some(parent) = self.parent_on_bus() {
                ContainerState::attach_injector(&parent.state, tx);
            }
            Some(tables)
        });
        let Some(tables) = tables else {
            return false;
        };
        if let Some(parent) = self.parent_off_bus() {
            parent
                .state
                .bus
                .rewire(|tx| ContainerState::attach_injector(&parent.state, tx));
        }

        info!(
            container = %self.name,
            descriptors = tables.descriptors.len(),
            filters = tables.filters.len(),
            "Container destroyed"
        );
        // Cached values are dropped here, after every lock is released.
        drop(tables);
        true
    }
}

impl Drop for ContainerState {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Builder for [`Container`]
pub struct ContainerBuilder {
    bus: EventBus,
    name: Option<String>,
    parent: Option<Container>,
}

impl ContainerBuilder {
    /// Start a container on `bus`
    pub fn new(bus: &EventBus) -> Self {
        Self {
            bus: bus.clone(),
            name: None,
            parent: None,
        }
    }

    /// Name used in logs and errors
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Resolve misses through `parent`
    pub fn parent(mut self, parent: &Container) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Create the container and subscribe it to the bus
    pub fn build(self) -> Container {
        let name = self
            .name
            .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string());

        if let Some(parent) = &self.parent {
            if !parent.state.bus.same_bus(&self.bus) {
                warn!(
                    container = %name,
                    parent = %parent.name(),
                    "Parent container listens on a different event bus"
                );
            }
        }

        let state = Arc::new(ContainerState {
            name,
            bus: self.bus,
            parent: self.parent,
            tables: RwLock::new(Some(Tables::default())),
            subscriptions: Mutex::new(Subscriptions::default()),
        });
        // The parent's injector leaves and the child's handlers arrive in a
        // single rewire: every event is injected by exactly one of them.
        state.bus.rewire(|tx| {
            if let Some(parent) = state.parent_on_bus() {
                parent.state.detach_injector(tx);
            }
            ContainerState::subscribe_all(&state, tx);
        });
        if let Some(parent) = state.parent_off_bus() {
            parent
                .state
                .bus
                .rewire(|tx| parent.state.detach_injector(tx));
        }

        info!(
            container = %state.name,
            parent = state.parent.as_ref().map(Container::name),
            "Container created"
        );
        Container { state }
    }
}

/// Handle to a dependency injection container.
///
/// Clones share the same container. The container is torn down by
/// [`destroy`](Self::destroy) or when the last handle is dropped.
#[derive(Clone)]
pub struct Container {
    pub(crate) state: Arc<ContainerState>,
}

impl Container {
    /// Builder for a container on `bus`
    pub fn builder(bus: &EventBus) -> ContainerBuilder {
        ContainerBuilder::new(bus)
    }

    /// Root container with the default name
    pub fn new(bus: &EventBus) -> Self {
        Self::builder(bus).build()
    }

    /// Named child of `parent`, on the parent's bus
    pub fn child_of<S: Into<String>>(parent: &Container, name: S) -> Self {
        Self::builder(&parent.state.bus)
            .name(name)
            .parent(parent)
            .build()
    }

    /// Container name
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Enclosing container, if any
    pub fn parent(&self) -> Option<&Container> {
        self.state.parent.as_ref()
    }

    /// Bus the container listens on
    pub fn bus(&self) -> &EventBus {
        &self.state.bus
    }

    /// Whether this container's injector is currently subscribed
    pub fn is_active(&self) -> bool {
        self.state.subscriptions().inject.is_some()
    }

    /// Whether the container was torn down
    pub fn is_destroyed(&self) -> bool {
        self.state.read_tables().is_none()
    }

    /// Whether both handles refer to the same container
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Tear the container down.
    ///
    /// Returns `false` if it was already destroyed.
    pub fn destroy(&self) -> bool {
        self.state.teardown()
    }

    /// Whether `T` has a local descriptor
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.state
            .read_tables()
            .as_ref()
            .is_some_and(|tables| tables.descriptors.contains_key(&DependencyKey::of::<T>()))
    }

    /// Local lifetime of `T`
    pub fn lifetime_of<T: ?Sized + 'static>(&self) -> Option<Lifetime> {
        self.state.read_tables().as_ref().and_then(|tables| {
            tables
                .descriptors
                .get(&DependencyKey::of::<T>())
                .map(DependencyDescriptor::lifetime)
        })
    }

    /// Local shared reference count of `T`
    pub fn ref_count<T: ?Sized + 'static>(&self) -> Option<usize> {
        self.state.read_tables().as_ref().and_then(|tables| {
            tables
                .descriptors
                .get(&DependencyKey::of::<T>())
                .map(DependencyDescriptor::ref_count)
        })
    }

    /// Whether a value for `T` is cached locally
    pub fn is_cached<T: ?Sized + 'static>(&self) -> bool {
        self.state.read_tables().as_ref().is_some_and(|tables| {
            tables
                .descriptors
                .get(&DependencyKey::of::<T>())
                .is_some_and(|descriptor| descriptor.cached().is_some())
        })
    }

    /// Local filter for `E`
    pub fn filter<E: Send + Sync + 'static>(&self) -> Option<Arc<Filter<E>>> {
        self.filter_for(DependencyKey::of::<E>())?
            .into_instance()
            .downcast::<Filter<E>>()
            .ok()
    }

    /// Summaries of every local descriptor, sorted by type name
    pub fn descriptors(&self) -> Vec<DescriptorSummary> {
        let mut summaries: Vec<DescriptorSummary> = self
            .state
            .read_tables()
            .as_ref()
            .map(|tables| {
                tables
                    .descriptors
                    .iter()
                    .map(|(key, descriptor)| DescriptorSummary {
                        type_name: key.type_name(),
                        lifetime: descriptor.lifetime(),
                        ref_count: descriptor.ref_count(),
                        cached: descriptor.cached().is_some(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        summaries.sort_by(|a, b| a.type_name.cmp(b.type_name));
        summaries
    }

    pub(crate) fn filter_for(&self, key: DependencyKey) -> Option<Arc<dyn AnyFilter>> {
        self.state
            .read_tables()
            .as_ref()
            .and_then(|tables| tables.filters.get(&key).cloned())
    }

    pub(crate) fn destroyed_error(&self) -> Error {
        Error::container_destroyed(self.name())
    }

    fn add_to_filter(&self, target: &ObjectRef, declared_type: DependencyKey) -> Result<()> {
        if let Some(filter) = self.filter_for(declared_type) {
            filter.add_object(target)?;
            debug!(
                container = %self.name(),
                element = declared_type.short_name(),
                members = filter.member_count(),
                "Filter member added"
            );
        }
        Ok(())
    }

    fn remove_from_filter(&self, target: &ObjectRef, declared_type: DependencyKey) -> Result<()> {
        if let Some(filter) = self.filter_for(declared_type) {
            filter.remove_object(target)?;
            debug!(
                container = %self.name(),
                element = declared_type.short_name(),
                members = filter.member_count(),
                "Filter member removed"
            );
        }
        Ok(())
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.state.name)
            .field("parent", &self.parent().map(Container::name))
            .field("active", &self.is_active())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
