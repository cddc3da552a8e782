//! Event Bus Tests

use crate::test_utils::{Enemy, EventLog};
use scenedi_domain::{DependencyKey, LifecycleEvent, LifecycleEventKind, ObjectRef};
use scenedi_infrastructure::EventBus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

fn enemy() -> ObjectRef {
    Arc::new(Enemy::default())
}

#[test]
fn test_handlers_run_in_subscription_order() {
    let bus = EventBus::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for index in 0..3 {
        let order = Arc::clone(&order);
        bus.on_create(move |_, _| order.lock().unwrap().push(index));
    }

    bus.emit_create(&enemy());

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn test_events_carry_declared_type() {
    let bus = EventBus::new();
    let log = EventLog::attach(&bus);
    let object = enemy();

    bus.emit_create(&object);
    bus.emit_destroy(&object);
    bus.publish(&LifecycleEvent::created(object));

    assert_eq!(
        log.entries(),
        vec!["create:Enemy", "destroy:Enemy", "create:Enemy"]
    );
}

#[test]
fn test_emit_without_subscribers_is_noop() {
    let bus = EventBus::new();
    bus.emit(
        LifecycleEventKind::Destroyed,
        &enemy(),
        DependencyKey::of::<Enemy>(),
    );
    assert_eq!(bus.subscriber_count(LifecycleEventKind::Destroyed), 0);
}

#[test]
fn test_unsubscribe() {
    let bus = EventBus::new();
    let log = EventLog::default();
    let recorder = log.clone();
    let id = bus.on_create(move |_, _| recorder.push("seen".to_string()));

    assert!(bus.is_subscribed(LifecycleEventKind::Created, id));
    assert!(bus.unsubscribe(LifecycleEventKind::Created, id));
    assert!(!bus.unsubscribe(LifecycleEventKind::Created, id));
    // Ids are per kind
    assert!(!bus.is_subscribed(LifecycleEventKind::Destroyed, id));

    bus.emit_create(&enemy());
    assert!(log.entries().is_empty());
}

#[test]
fn test_subscribe_during_dispatch_applies_to_next_emit() {
    let bus = EventBus::new();
    let log = EventLog::default();

    let inner_bus = bus.clone();
    let inner_log = log.clone();
    bus.on_create(move |_, _| {
        let late = inner_log.clone();
        inner_bus.on_create(move |_, _| late.push("late".to_string()));
    });

    bus.emit_create(&enemy());
    assert!(log.entries().is_empty());

    bus.emit_create(&enemy());
    assert_eq!(log.entries(), vec!["late"]);
}

#[test]
fn test_handler_may_emit_nested_events() {
    let bus = EventBus::new();
    let log = EventLog::attach(&bus);

    let nested_bus = bus.clone();
    bus.on_create(move |object, _| nested_bus.emit_destroy(object));

    bus.emit_create(&enemy());

    assert_eq!(log.entries(), vec!["create:Enemy", "destroy:Enemy"]);
}

#[test]
fn test_clones_share_subscribers() {
    let bus = EventBus::new();
    let clone = bus.clone();
    let other = EventBus::new();

    clone.on_destroy(|_, _| {});

    assert_eq!(bus.subscriber_count(LifecycleEventKind::Destroyed), 1);
    assert!(bus.same_bus(&clone));
    assert!(!bus.same_bus(&other));
}

#[test]
fn test_rewire_applies_batch() {
    let bus = EventBus::new();
    let old = bus.on_create(|_, _| {});

    let new = bus.rewire(|tx| {
        assert!(tx.unsubscribe(LifecycleEventKind::Created, old));
        tx.subscribe(
            LifecycleEventKind::Created,
            Arc::new(|_: &ObjectRef, _: DependencyKey| {}),
        )
    });

    assert!(!bus.is_subscribed(LifecycleEventKind::Created, old));
    assert!(bus.is_subscribed(LifecycleEventKind::Created, new));
    assert_eq!(bus.subscriber_count(LifecycleEventKind::Created), 1);
}

#[test]
fn test_rewire_waits_for_dispatch_on_other_thread() {
    let bus = EventBus::new();
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let release_rx = Mutex::new(release_rx);
    bus.on_create(move |_, _| {
        entered_tx.send(()).unwrap();
        release_rx.lock().unwrap().recv().unwrap();
    });

    let emitter = {
        let bus = bus.clone();
        thread::spawn(move || bus.emit_create(&enemy()))
    };
    entered_rx.recv().unwrap();

    let rewired = Arc::new(AtomicBool::new(false));
    let rewirer = {
        let bus = bus.clone();
        let rewired = Arc::clone(&rewired);
        thread::spawn(move || {
            bus.on_destroy(|_, _| {});
            rewired.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!rewired.load(Ordering::SeqCst));

    release_tx.send(()).unwrap();
    emitter.join().unwrap();
    rewirer.join().unwrap();
    assert!(rewired.load(Ordering::SeqCst));
    assert_eq!(bus.subscriber_count(LifecycleEventKind::Destroyed), 1);
}
