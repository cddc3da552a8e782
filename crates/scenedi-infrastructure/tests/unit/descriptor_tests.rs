//! Descriptor Tests

use scenedi_domain::{Instance, Lifetime, ObjectRef};
use scenedi_infrastructure::di::{DependencyDescriptor, Factory, Release, ReleaseHook, Resolution};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counting_factory(calls: &Arc<AtomicUsize>) -> Factory {
    let calls = Arc::clone(calls);
    Arc::new(move |_: Option<&ObjectRef>| {
        let serial = calls.fetch_add(1, Ordering::SeqCst) + 1;
        Some(Arc::new(serial) as Instance)
    })
}

fn empty_factory() -> Factory {
    Arc::new(|_: Option<&ObjectRef>| None)
}

fn serial(value: &Instance) -> usize {
    *Arc::clone(value).downcast::<usize>().unwrap()
}

#[test]
fn test_singleton_returns_stored_value() {
    let mut descriptor = DependencyDescriptor::singleton(Some(Arc::new(7_usize) as Instance));

    let first = descriptor.resolve(None).unwrap().unwrap();
    let second = descriptor.resolve(None).unwrap().unwrap();

    assert_eq!(descriptor.lifetime(), Lifetime::Singleton);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(descriptor.ref_count(), 0);
}

#[test]
fn test_transient_invokes_factory_every_time() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut descriptor = DependencyDescriptor::transient(counting_factory(&calls));

    let first = descriptor.resolve(None).unwrap().unwrap();
    let second = descriptor.resolve(None).unwrap().unwrap();

    assert_eq!(serial(&first), 1);
    assert_eq!(serial(&second), 2);
    assert!(descriptor.cached().is_none());
    assert_eq!(descriptor.ref_count(), 0);
}

#[test]
fn test_shared_constructs_once_per_generation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut descriptor = DependencyDescriptor::shared(counting_factory(&calls), None);

    let first = descriptor.resolve(None).unwrap().unwrap();
    let second = descriptor.resolve(None).unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(descriptor.ref_count(), 2);

    assert!(matches!(descriptor.release(), Release::Retained(1)));
    match descriptor.release() {
        Release::Released { value, hook } => {
            assert!(Arc::ptr_eq(&value, &first));
            assert!(hook.is_none());
        }
        _ => panic!("Expected the cached value to be released"),
    }
    assert!(descriptor.cached().is_none());

    let third = descriptor.resolve(None).unwrap().unwrap();
    assert_eq!(serial(&third), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_shared_counts_reference_when_factory_yields_nothing() {
    let mut descriptor = DependencyDescriptor::shared(empty_factory(), None);

    assert!(descriptor.resolve(None).unwrap().is_none());
    assert_eq!(descriptor.ref_count(), 1);
    assert!(matches!(descriptor.release(), Release::Emptied));
}

#[test]
fn test_release_without_resolution_is_unbalanced() {
    let mut descriptor = DependencyDescriptor::shared(empty_factory(), None);
    assert!(matches!(descriptor.release(), Release::Unbalanced));
    assert_eq!(descriptor.ref_count(), 0);
}

#[test]
fn test_release_on_non_shared_is_noop() {
    let mut descriptor = DependencyDescriptor::singleton(None);
    assert!(matches!(descriptor.release(), Release::Retained(0)));
}

#[test]
fn test_release_hook_is_handed_out() {
    let hook: ReleaseHook = Arc::new(|_: &Instance| {});
    let calls = Arc::new(AtomicUsize::new(0));
    let mut descriptor = DependencyDescriptor::shared(counting_factory(&calls), Some(hook));

    descriptor.resolve(None).unwrap();
    match descriptor.release() {
        Release::Released { hook, .. } => assert!(hook.is_some()),
        _ => panic!("Expected release with hook"),
    }
}

#[test]
fn test_two_phase_resolution() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut descriptor = DependencyDescriptor::shared(counting_factory(&calls), None);

    let Resolution::Construct(factory) = descriptor.begin_resolve().unwrap() else {
        panic!("First shared resolution must construct");
    };
    let value = factory(None);
    descriptor.complete_resolve(value.as_ref());

    assert!(matches!(
        descriptor.begin_resolve().unwrap(),
        Resolution::Ready(Some(_))
    ));
    assert_eq!(descriptor.ref_count(), 2);
}
