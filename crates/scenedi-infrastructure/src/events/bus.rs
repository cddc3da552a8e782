//! Lifecycle Event Bus
//!
//! Synchronous, in-process broadcast of create/destroy events.
//!
//! ## Dispatch Semantics
//!
//! - Handlers run on the emitting thread, in subscription order.
//! - No queuing, no deduplication.
//! - The handler list is copied when an emit starts and the lock is released
//!   before any handler runs. Handlers may therefore subscribe, unsubscribe
//!   and emit nested events; such changes take effect from the next emit.
//!   A handler unsubscribed mid-dispatch still receives the current event.
//!
//! ## Threads
//!
//! Events may be emitted from any thread. A dispatch holds the bus's rewiring
//! lock for reading from its first handler to its last, and every change to
//! the subscriber lists goes through [`EventBus::rewire`], which holds it for
//! writing. A batch of subscribe/unsubscribe calls is therefore seen by each
//! event either entirely or not at all. Nested emits and rewires issued by a
//! handler on the dispatching thread run under the guard already held.
//!
//! The bus is a cheap handle: clones share the same subscriber lists, and
//! each independent bus is a separate DI universe.

use scenedi_domain::{DependencyKey, LifecycleEvent, LifecycleEventKind, ObjectRef};
use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

/// Callback receiving `(instance, declared type)`
pub type LifecycleHandler = Arc<dyn Fn(&ObjectRef, DependencyKey) + Send + Sync>;

/// Identifies one subscription for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type HandlerList = RwLock<Vec<(SubscriptionId, LifecycleHandler)>>;

thread_local! {
    // Buses this thread is currently dispatching on, by address
    static DISPATCHING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks the current thread as dispatching on one bus until dropped
struct DispatchScope {
    bus: usize,
}

impl DispatchScope {
    fn enter(bus: usize) -> Self {
        DISPATCHING.with_borrow_mut(|active| active.push(bus));
        Self { bus }
    }

    fn is_active(bus: usize) -> bool {
        DISPATCHING.with_borrow(|active| active.contains(&bus))
    }
}

impl Drop for DispatchScope {
    fn drop(&mut self) {
        DISPATCHING.with_borrow_mut(|active| {
            if let Some(position) = active.iter().rposition(|bus| *bus == self.bus) {
                active.remove(position);
            }
        });
    }
}

#[derive(Default)]
struct BusState {
    next_id: AtomicU64,
    rewiring: RwLock<()>,
    on_create: HandlerList,
    on_destroy: HandlerList,
}

impl BusState {
    fn handlers(&self, kind: LifecycleEventKind) -> &HandlerList {
        match kind {
            LifecycleEventKind::Created => &self.on_create,
            LifecycleEventKind::Destroyed => &self.on_destroy,
        }
    }

    fn address(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self).addr()
    }

    /// Read guard for one dispatch, unless this thread already holds it
    fn dispatch_guard(self: &Arc<Self>) -> Option<RwLockReadGuard<'_, ()>> {
        if DispatchScope::is_active(self.address()) {
            return None;
        }
        Some(self.rewiring.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Write guard for one rewire, unless this thread is dispatching
    fn rewire_guard(self: &Arc<Self>) -> Option<RwLockWriteGuard<'_, ()>> {
        if DispatchScope::is_active(self.address()) {
            return None;
        }
        Some(self.rewiring.write().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Subscriber-list edits applied by one [`EventBus::rewire`] call
pub struct Rewiring<'a> {
    state: &'a BusState,
    retired: Vec<LifecycleHandler>,
}

impl Rewiring<'_> {
    /// Append `handler` to the subscribers of `kind`
    pub fn subscribe(
        &mut self,
        kind: LifecycleEventKind,
        handler: LifecycleHandler,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.state.next_id.fetch_add(1, Ordering::Relaxed));
        self.state
            .handlers(kind)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, handler));
        trace!(event = %kind, subscription = id.0, "Handler subscribed");
        id
    }

    /// Remove a subscription; returns whether it was present
    pub fn unsubscribe(&mut self, kind: LifecycleEventKind, id: SubscriptionId) -> bool {
        let removed = {
            let mut handlers = self
                .state
                .handlers(kind)
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            handlers
                .iter()
                .position(|(existing, _)| *existing == id)
                .map(|position| handlers.remove(position).1)
        };
        match removed {
            Some(handler) => {
                // Dropped once the rewire is over; handlers may own containers.
                self.retired.push(handler);
                trace!(event = %kind, subscription = id.0, "Handler unsubscribed");
                true
            }
            None => false,
        }
    }
}

/// Broadcasts lifecycle events to subscribed handlers
#[derive(Clone, Default)]
pub struct EventBus {
    state: Arc<BusState>,
}

impl EventBus {
    /// Create a bus with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the subscribers of `kind`
    pub fn subscribe(
        &self,
        kind: LifecycleEventKind,
        handler: LifecycleHandler,
    ) -> SubscriptionId {
        self.rewire(|tx| tx.subscribe(kind, handler))
    }

    /// Subscribe a closure to create events
    pub fn on_create<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ObjectRef, DependencyKey) + Send + Sync + 'static,
    {
        self.subscribe(LifecycleEventKind::Created, Arc::new(handler))
    }

    /// Subscribe a closure to destroy events
    pub fn on_destroy<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ObjectRef, DependencyKey) + Send + Sync + 'static,
    {
        self.subscribe(LifecycleEventKind::Destroyed, Arc::new(handler))
    }

    /// Remove a subscription; returns whether it was present
    pub fn unsubscribe(&self, kind: LifecycleEventKind, id: SubscriptionId) -> bool {
        self.rewire(|tx| tx.unsubscribe(kind, id))
    }

    /// Apply a batch of subscriber changes atomically with respect to
    /// dispatch.
    ///
    /// Waits for in-flight dispatches on other threads to finish, and holds
    /// new ones back until `batch` returns. Handlers removed by the batch are
    /// dropped after the lock is released.
    pub fn rewire<R>(&self, batch: impl FnOnce(&mut Rewiring<'_>) -> R) -> R {
        let mut tx = Rewiring {
            state: self.state.as_ref(),
            retired: Vec::new(),
        };
        let result = {
            let _guard = self.state.rewire_guard();
            batch(&mut tx)
        };
        drop(tx);
        result
    }

    /// Invoke every current handler of `kind` with `(instance, declared_type)`
    pub fn emit(
        &self,
        kind: LifecycleEventKind,
        instance: &ObjectRef,
        declared_type: DependencyKey,
    ) {
        let _guard = self.state.dispatch_guard();
        let _scope = DispatchScope::enter(self.state.address());

        let handlers: Vec<LifecycleHandler> = self
            .state
            .handlers(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        trace!(
            event = %kind,
            declared_type = declared_type.short_name(),
            handlers = handlers.len(),
            "Dispatching lifecycle event"
        );

        for handler in handlers {
            handler(instance, declared_type);
        }
    }

    /// Emit a create event keyed by the object's declared type
    pub fn emit_create(&self, instance: &ObjectRef) {
        self.emit(LifecycleEventKind::Created, instance, instance.declared_type());
    }

    /// Emit a destroy event keyed by the object's declared type
    pub fn emit_destroy(&self, instance: &ObjectRef) {
        self.emit(LifecycleEventKind::Destroyed, instance, instance.declared_type());
    }

    /// Emit a prepared event
    pub fn publish(&self, event: &LifecycleEvent) {
        self.emit(event.kind, &event.instance, event.declared_type);
    }

    /// Number of handlers subscribed to `kind`
    pub fn subscriber_count(&self, kind: LifecycleEventKind) -> usize {
        self.state
            .handlers(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether a subscription is still registered
    pub fn is_subscribed(&self, kind: LifecycleEventKind, id: SubscriptionId) -> bool {
        self.state
            .handlers(kind)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(existing, _)| *existing == id)
    }

    /// Whether two handles refer to the same bus
    pub fn same_bus(&self, other: &EventBus) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("on_create", &self.subscriber_count(LifecycleEventKind::Created))
            .field("on_destroy", &self.subscriber_count(LifecycleEventKind::Destroyed))
            .finish()
    }
}
