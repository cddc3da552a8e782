//! Error Tests

use scenedi_domain::error::Error;
use std::io;

#[test]
fn test_duplicate_registration_message() {
    let error = Error::duplicate_registration("Logger");
    assert_eq!(error.to_string(), "Logger is already registered");
}

#[test]
fn test_unresolved_dependency_names_target_and_dependency() {
    let error = Error::unresolved("game::Enemy", "logger", "game::Logger");
    let message = error.to_string();
    assert!(message.contains("game::Enemy"));
    assert!(message.contains("game::Logger"));
    assert!(message.contains("'logger'"));
}

#[test]
fn test_unknown_lifetime_message() {
    let error = Error::unknown_lifetime("scoped");
    assert_eq!(error.to_string(), "Unknown lifetime type: scoped");
}

#[test]
fn test_only_unresolved_dependency_is_recoverable() {
    assert!(Error::unresolved("A", "b", "B").is_recoverable());
    assert!(!Error::duplicate_registration("A").is_recoverable());
    assert!(!Error::type_mismatch("A", "B").is_recoverable());
    assert!(!Error::container_destroyed("root").is_recoverable());
    assert!(!Error::config("bad").is_recoverable());
}

#[test]
fn test_io_error_conversion() {
    let error: Error = io::Error::new(io::ErrorKind::NotFound, "missing").into();
    match error {
        Error::Io { source } => assert_eq!(source.kind(), io::ErrorKind::NotFound),
        other => panic!("Expected Io error, got {other:?}"),
    }
}

#[test]
fn test_config_with_source_keeps_source() {
    let source = io::Error::other("disk");
    let error = Error::config_with_source("cannot read", source);
    assert!(std::error::Error::source(&error).is_some());
    assert!(error.to_string().contains("cannot read"));
}
