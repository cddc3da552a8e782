//! Filter Tests

use scenedi_domain::{AnyFilter, DependencyKey, Error, Filter, Injectable, ObjectRef};
use std::sync::Arc;

#[derive(Default)]
struct Enemy;

impl Injectable for Enemy {}

#[derive(Default)]
struct Bullet;

impl Injectable for Bullet {}

fn enemy() -> (Arc<Enemy>, ObjectRef) {
    let enemy = Arc::new(Enemy);
    let object: ObjectRef = enemy.clone();
    (enemy, object)
}

#[test]
fn test_add_keeps_creation_order() {
    let filter = Filter::<Enemy>::new();
    let (first, first_ref) = enemy();
    let (second, second_ref) = enemy();

    filter.add(&first_ref).unwrap();
    filter.add(&second_ref).unwrap();

    assert_eq!(filter.len(), 2);
    assert!(Arc::ptr_eq(&filter.get(0).unwrap(), &first));
    assert!(Arc::ptr_eq(&filter.get(1).unwrap(), &second));
}

#[test]
fn test_add_ignores_duplicates() {
    let filter = Filter::<Enemy>::new();
    let (_, object) = enemy();

    filter.add(&object).unwrap();
    filter.add(&object).unwrap();

    assert_eq!(filter.len(), 1);
}

#[test]
fn test_remove_preserves_order_of_rest() {
    let filter = Filter::<Enemy>::new();
    let members: Vec<_> = (0..3).map(|_| enemy()).collect();
    for (_, object) in &members {
        filter.add(object).unwrap();
    }

    assert!(filter.remove(&members[1].1).unwrap());
    assert!(!filter.remove(&members[1].1).unwrap());

    assert_eq!(filter.len(), 2);
    assert!(Arc::ptr_eq(&filter.get(0).unwrap(), &members[0].0));
    assert!(Arc::ptr_eq(&filter.get(1).unwrap(), &members[2].0));
}

#[test]
fn test_wrong_type_is_rejected() {
    let filter = Filter::<Enemy>::new();
    let bullet: ObjectRef = Arc::new(Bullet);

    assert!(matches!(filter.add(&bullet), Err(Error::TypeMismatch { .. })));
    assert!(matches!(filter.remove(&bullet), Err(Error::TypeMismatch { .. })));
    assert!(filter.is_empty());
}

#[test]
fn test_rejected_object_leaves_members_untouched() {
    let filter = Filter::<Enemy>::new();
    let members: Vec<_> = (0..2).map(|_| enemy()).collect();
    for (_, object) in &members {
        filter.add(object).unwrap();
    }
    let bullet: ObjectRef = Arc::new(Bullet);

    assert!(filter.add(&bullet).is_err());
    assert!(filter.remove(&bullet).is_err());

    assert_eq!(filter.len(), 2);
    assert!(Arc::ptr_eq(&filter.get(0).unwrap(), &members[0].0));
    assert!(Arc::ptr_eq(&filter.get(1).unwrap(), &members[1].0));
}

#[test]
fn test_iteration_uses_snapshot() {
    let filter = Filter::<Enemy>::new();
    let members: Vec<_> = (0..3).map(|_| enemy()).collect();
    for (_, object) in &members {
        filter.add(object).unwrap();
    }

    let mut visited = 0;
    for member in filter.iter() {
        filter.take(&member);
        visited += 1;
    }

    assert_eq!(visited, 3);
    assert!(filter.is_empty());
}

#[test]
fn test_erased_view() {
    let filter: Arc<dyn AnyFilter> = Arc::new(Filter::<Enemy>::new());
    let (_, object) = enemy();

    assert_eq!(filter.element_key(), DependencyKey::of::<Enemy>());
    filter.add_object(&object).unwrap();
    assert_eq!(filter.member_count(), 1);

    let typed = filter.into_instance().downcast::<Filter<Enemy>>().unwrap();
    assert_eq!(typed.len(), 1);
}
