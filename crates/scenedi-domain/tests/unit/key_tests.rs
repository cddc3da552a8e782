//! Dependency Key Tests

use scenedi_domain::DependencyKey;
use std::collections::HashSet;

mod game {
    pub struct Logger;
    pub struct Enemy;
}

#[test]
fn test_keys_compare_by_type() {
    assert_eq!(
        DependencyKey::of::<game::Logger>(),
        DependencyKey::of::<game::Logger>()
    );
    assert_ne!(
        DependencyKey::of::<game::Logger>(),
        DependencyKey::of::<game::Enemy>()
    );
}

#[test]
fn test_keys_hash_by_type() {
    let mut keys = HashSet::new();
    keys.insert(DependencyKey::of::<game::Logger>());
    keys.insert(DependencyKey::of::<game::Logger>());
    keys.insert(DependencyKey::of::<game::Enemy>());
    assert_eq!(keys.len(), 2);
}

#[test]
fn test_names() {
    let key = DependencyKey::of::<game::Logger>();
    assert!(key.type_name().ends_with("game::Logger"));
    assert_eq!(key.short_name(), "Logger");
    assert_eq!(key.to_string(), key.type_name());
    assert!(key.is::<game::Logger>());
    assert!(!key.is::<game::Enemy>());
}
