//! Container Tests

use crate::test_utils::{Counter, Enemy, Logger, Musician, Spawner, logger_factory};
use scenedi_domain::{
    DependencyKey, EngineManaged, Error, LifecycleEventKind, Lifetime, ObjectRef, ObjectRefExt,
};
use scenedi_infrastructure::{Container, EventBus, Tracked};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

fn setup() -> (EventBus, Container) {
    let bus = EventBus::new();
    let container = Container::builder(&bus).name("test").build();
    (bus, container)
}

// ----------------------------------------------------------------------------
// Registration
// ----------------------------------------------------------------------------

#[test]
fn test_duplicate_registration_is_rejected_for_every_lifetime() {
    let (_bus, container) = setup();
    let counter = Counter::new();
    container
        .register_singleton::<Logger, _>(logger_factory(&counter))
        .unwrap();

    let singleton = container.register_singleton::<Logger, _>(logger_factory(&counter));
    let transient = container.register_transient::<Logger, _>(logger_factory(&counter));
    let shared = container.register_shared::<Logger, _>(logger_factory(&counter));

    assert!(matches!(singleton, Err(Error::DuplicateRegistration { .. })));
    assert!(matches!(transient, Err(Error::DuplicateRegistration { .. })));
    assert!(matches!(shared, Err(Error::DuplicateRegistration { .. })));
    assert_eq!(container.lifetime_of::<Logger>(), Some(Lifetime::Singleton));
    // The rejected singleton factory never ran
    assert_eq!(counter.get(), 1);
}

#[test]
fn test_duplicate_filter_is_rejected() {
    let (_bus, container) = setup();
    container.register_filter::<Enemy>().unwrap();

    match container.register_filter::<Enemy>() {
        Err(Error::DuplicateRegistration { key }) => assert_eq!(key, "Filter<Enemy>"),
        other => panic!("Expected DuplicateRegistration, got {other:?}"),
    }
}

#[test]
fn test_register_by_lifetime() {
    let (_bus, container) = setup();
    let counter = Counter::new();

    let value = container
        .register::<Logger, _>(Lifetime::Singleton, logger_factory(&counter))
        .unwrap();
    container
        .register::<Enemy, _>(Lifetime::Transient, |_: Option<&ObjectRef>| None)
        .unwrap();
    container
        .register::<Spawner, _>(Lifetime::Shared, |_: Option<&ObjectRef>| None)
        .unwrap();

    assert_eq!(value.unwrap().serial, 1);
    assert_eq!(container.lifetime_of::<Enemy>(), Some(Lifetime::Transient));
    assert_eq!(container.lifetime_of::<Spawner>(), Some(Lifetime::Shared));
}

#[test]
fn test_descriptor_summaries() {
    let (_bus, container) = setup();
    let counter = Counter::new();
    container
        .register_shared::<Logger, _>(logger_factory(&counter))
        .unwrap();

    let summaries = container.descriptors();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].type_name, DependencyKey::of::<Logger>().type_name());
    assert_eq!(summaries[0].lifetime, Lifetime::Shared);
    assert_eq!(summaries[0].ref_count, 0);
    assert!(!summaries[0].cached);
}

// ----------------------------------------------------------------------------
// Lifetimes
// ----------------------------------------------------------------------------

#[test]
fn test_singleton_is_built_once_at_registration() {
    let (bus, container) = setup();
    let counter = Counter::new();
    let logger = container
        .register_singleton::<Logger, _>(logger_factory(&counter))
        .unwrap()
        .unwrap();
    assert_eq!(counter.get(), 1);

    let first = Tracked::new(&bus, Enemy::default());
    let second = Tracked::new(&bus, Enemy::default());

    assert_eq!(counter.get(), 1);
    assert!(Arc::ptr_eq(&first.logger.get().unwrap(), &logger));
    assert!(Arc::ptr_eq(&second.logger.get().unwrap(), &logger));
}

#[test]
fn test_transient_builds_per_injection_and_sees_requester() {
    let (bus, container) = setup();
    let counter = Counter::new();
    let saw_enemy = Arc::new(AtomicBool::new(false));
    let seen = Arc::clone(&saw_enemy);
    let build = logger_factory(&counter);
    container
        .register_transient::<Logger, _>(move |requester: Option<&ObjectRef>| {
            if requester.and_then(|r| r.downcast_arc::<Enemy>()).is_some() {
                seen.store(true, Ordering::SeqCst);
            }
            build(requester)
        })
        .unwrap();

    let first = Tracked::new(&bus, Enemy::default());
    let second = Tracked::new(&bus, Enemy::default());

    assert_eq!(first.logger.get().unwrap().serial, 1);
    assert_eq!(second.logger.get().unwrap().serial, 2);
    assert!(saw_enemy.load(Ordering::SeqCst));
    assert!(!container.is_cached::<Logger>());
}

#[test]
fn test_shared_is_counted_and_released() {
    let (bus, container) = setup();
    let counter = Counter::new();
    container
        .register_shared::<Logger, _>(logger_factory(&counter))
        .unwrap();

    let first = Tracked::new(&bus, Enemy::default());
    let second = Tracked::new(&bus, Enemy::default());
    assert_eq!(counter.get(), 1);
    assert_eq!(container.ref_count::<Logger>(), Some(2));
    assert!(Arc::ptr_eq(
        &first.logger.get().unwrap(),
        &second.logger.get().unwrap()
    ));

    drop(first);
    assert_eq!(container.ref_count::<Logger>(), Some(1));
    assert!(container.is_cached::<Logger>());

    drop(second);
    assert_eq!(container.ref_count::<Logger>(), Some(0));
    assert!(!container.is_cached::<Logger>());

    let third = Tracked::new(&bus, Enemy::default());
    assert_eq!(third.logger.get().unwrap().serial, 2);
}

#[test]
fn test_every_inject_call_counts() {
    let (_bus, container) = setup();
    let counter = Counter::new();
    container
        .register_shared::<Logger, _>(logger_factory(&counter))
        .unwrap();
    let object: ObjectRef = Arc::new(Enemy::default());

    container
        .inject(&object, DependencyKey::of::<Enemy>())
        .unwrap();
    container
        .inject(&object, DependencyKey::of::<Enemy>())
        .unwrap();

    assert_eq!(container.ref_count::<Logger>(), Some(2));
    assert_eq!(counter.get(), 1);
}

struct Prop {
    destroyed: Arc<AtomicUsize>,
    carrier_destroyed: Arc<AtomicUsize>,
    sole: bool,
}

impl EngineManaged for Prop {
    fn request_destroy(&self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }

    fn is_sole_component(&self) -> bool {
        self.sole
    }

    fn request_carrier_destroy(&self) {
        self.carrier_destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct Stage {
    prop: scenedi_domain::Injected<Prop>,
}

impl scenedi_domain::Injectable for Stage {
    fn slot_table() -> scenedi_domain::SlotTable<Self> {
        scenedi_domain::SlotTable::new().dependency("prop", |s: &Self| &s.prop)
    }
}

fn managed_release(sole: bool) -> (usize, usize) {
    let (bus, container) = setup();
    let destroyed = Arc::new(AtomicUsize::new(0));
    let carrier_destroyed = Arc::new(AtomicUsize::new(0));
    let (d, c) = (Arc::clone(&destroyed), Arc::clone(&carrier_destroyed));
    container
        .register_shared_managed::<Prop, _>(move |_: Option<&ObjectRef>| {
            Some(Arc::new(Prop {
                destroyed: Arc::clone(&d),
                carrier_destroyed: Arc::clone(&c),
                sole,
            }))
        })
        .unwrap();

    let first = Tracked::new(&bus, Stage::default());
    let second = Tracked::new(&bus, Stage::default());
    drop(first);
    assert_eq!(destroyed.load(Ordering::SeqCst), 0);
    drop(second);

    (
        destroyed.load(Ordering::SeqCst),
        carrier_destroyed.load(Ordering::SeqCst),
    )
}

#[test]
fn test_managed_shared_is_destroyed_with_its_carrier() {
    assert_eq!(managed_release(true), (1, 1));
}

#[test]
fn test_managed_shared_keeps_a_busy_carrier() {
    assert_eq!(managed_release(false), (1, 0));
}

// ----------------------------------------------------------------------------
// Filters
// ----------------------------------------------------------------------------

#[test]
fn test_filter_tracks_live_instances() {
    let (bus, container) = setup();
    let filter = container.register_filter::<Enemy>().unwrap();

    let first = Tracked::new(&bus, Enemy::default());
    let second = Tracked::new(&bus, Enemy::default());
    assert_eq!(filter.len(), 2);
    assert!(filter.contains(first.object()));

    drop(first);
    assert_eq!(filter.len(), 1);
    assert!(filter.contains(second.object()));
}

#[test]
fn test_filter_slot_receives_local_filter() {
    let (bus, container) = setup();
    let counter = Counter::new();
    container
        .register_singleton::<Logger, _>(logger_factory(&counter))
        .unwrap();
    let filter = container.register_filter::<Enemy>().unwrap();

    let spawner = Tracked::new(&bus, Spawner::default());
    let _enemy = Tracked::new(&bus, Enemy::default());

    let injected = spawner.enemies.get().unwrap();
    assert!(Arc::ptr_eq(&injected, &filter));
    assert_eq!(injected.len(), 1);
    assert!(Arc::ptr_eq(&container.filter::<Enemy>().unwrap(), &filter));
}

#[test]
fn test_filter_slot_without_registration_stays_empty() {
    let (bus, container) = setup();
    let counter = Counter::new();
    container
        .register_singleton::<Logger, _>(logger_factory(&counter))
        .unwrap();

    let spawner = Tracked::new(&bus, Spawner::default());

    assert!(spawner.logger.is_set());
    assert!(!spawner.enemies.is_set());
}

#[test]
fn test_filter_type_mismatch_is_contained() {
    let (bus, container) = setup();
    let filter = container.register_filter::<Enemy>().unwrap();
    let impostor: ObjectRef = Arc::new(Spawner::default());

    bus.emit(
        LifecycleEventKind::Created,
        &impostor,
        DependencyKey::of::<Enemy>(),
    );

    assert!(filter.is_empty());
}

// ----------------------------------------------------------------------------
// Injection outcome
// ----------------------------------------------------------------------------

#[test]
fn test_unresolved_slot_does_not_block_the_rest() {
    let (bus, container) = setup();
    let counter = Counter::new();
    container
        .register_singleton::<Logger, _>(logger_factory(&counter))
        .unwrap();

    let musician = Tracked::new(&bus, Musician::default());

    assert!(!musician.audio.is_set());
    assert!(musician.logger.is_set());
}

#[test]
fn test_injection_report() {
    let (_bus, container) = setup();
    let counter = Counter::new();
    container
        .register_singleton::<Logger, _>(logger_factory(&counter))
        .unwrap();
    let object: ObjectRef = Arc::new(Musician::default());

    let report = container
        .inject(&object, DependencyKey::of::<Musician>())
        .unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.resolved, vec!["logger"]);
    assert_eq!(report.unresolved.len(), 1);
    assert!(matches!(
        &report.unresolved[0],
        Error::UnresolvedDependency { slot, .. } if slot == "audio"
    ));
}

#[test]
fn test_typed_resolve_and_release() {
    let (_bus, container) = setup();
    let counter = Counter::new();
    container
        .register_shared::<Logger, _>(logger_factory(&counter))
        .unwrap();

    let logger = container.resolve::<Logger>(None).unwrap();
    assert_eq!(logger.serial, 1);
    assert_eq!(container.ref_count::<Logger>(), Some(1));

    assert!(container.release_shared::<Logger>().unwrap());
    assert!(!container.is_cached::<Logger>());
    assert!(!container.release_shared::<Enemy>().unwrap());

    assert!(matches!(
        container.resolve::<Enemy>(None),
        Err(Error::UnresolvedDependency { .. })
    ));
}

// ----------------------------------------------------------------------------
// Teardown
// ----------------------------------------------------------------------------

#[test]
fn test_destroy_unsubscribes_and_clears() {
    let (bus, container) = setup();
    let counter = Counter::new();
    container
        .register_shared::<Logger, _>(logger_factory(&counter))
        .unwrap();
    let enemy = Tracked::new(&bus, Enemy::default());
    assert_eq!(bus.subscriber_count(LifecycleEventKind::Created), 2);
    assert_eq!(bus.subscriber_count(LifecycleEventKind::Destroyed), 2);

    assert!(container.destroy());
    assert!(!container.destroy());

    assert!(container.is_destroyed());
    assert!(!container.is_active());
    assert_eq!(bus.subscriber_count(LifecycleEventKind::Created), 0);
    assert_eq!(bus.subscriber_count(LifecycleEventKind::Destroyed), 0);
    assert!(!container.is_registered::<Logger>());
    // Already injected values stay in place
    assert!(enemy.logger.is_set());

    let late = Tracked::new(&bus, Enemy::default());
    assert!(!late.logger.is_set());

    assert!(matches!(
        container.register_shared::<Logger, _>(logger_factory(&counter)),
        Err(Error::ContainerDestroyed { .. })
    ));
}

#[test]
fn test_dropping_last_handle_tears_down() {
    let bus = EventBus::new();
    let container = Container::new(&bus);
    let clone = container.clone();
    drop(container);
    assert_eq!(bus.subscriber_count(LifecycleEventKind::Created), 2);

    drop(clone);
    assert_eq!(bus.subscriber_count(LifecycleEventKind::Created), 0);
    assert_eq!(bus.subscriber_count(LifecycleEventKind::Destroyed), 0);
}
