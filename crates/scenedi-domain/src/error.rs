//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for scenedi
#[derive(Error, Debug)]
pub enum Error {
    /// A type was registered twice in the same container
    #[error("{key} is already registered")]
    DuplicateRegistration {
        /// Name of the dependency or filter key
        key: String,
    },

    /// No container along the parent chain could provide a dependency
    #[error("Injecting to {target} error. Dependency {dependency} for slot '{slot}' is not registered")]
    UnresolvedDependency {
        /// Type name of the object being injected
        target: String,
        /// Name of the slot left unset
        slot: String,
        /// Type name of the missing dependency
        dependency: String,
    },

    /// A value did not satisfy the type a slot or filter expects
    #[error("{actual} is not of type {expected}")]
    TypeMismatch {
        /// The expected type
        expected: String,
        /// The type (or description) actually received
        actual: String,
    },

    /// A lifetime tag outside the supported set
    #[error("Unknown lifetime type: {tag}")]
    UnknownLifetime {
        /// The offending tag
        tag: String,
    },

    /// Operation on a container that was already torn down
    #[error("Container '{container}' has been destroyed")]
    ContainerDestroyed {
        /// Name of the container
        container: String,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O operation error
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

// Registration and resolution errors
impl Error {
    /// Create a duplicate registration error
    pub fn duplicate_registration<S: Into<String>>(key: S) -> Self {
        Self::DuplicateRegistration { key: key.into() }
    }

    /// Create an unresolved dependency error
    pub fn unresolved<T, S, D>(target: T, slot: S, dependency: D) -> Self
    where
        T: Into<String>,
        S: Into<String>,
        D: Into<String>,
    {
        Self::UnresolvedDependency {
            target: target.into(),
            slot: slot.into(),
            dependency: dependency.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch<E: Into<String>, A: Into<String>>(expected: E, actual: A) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an unknown lifetime error
    pub fn unknown_lifetime<S: Into<String>>(tag: S) -> Self {
        Self::UnknownLifetime { tag: tag.into() }
    }

    /// Create a container destroyed error
    pub fn container_destroyed<S: Into<String>>(container: S) -> Self {
        Self::ContainerDestroyed {
            container: container.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }
}

// Configuration and infrastructure errors
impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }

    /// Whether the host can carry on after this error.
    ///
    /// Only a missed dependency is degraded gracefully; everything else is a
    /// configuration mistake or a bug and must reach the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnresolvedDependency { .. })
    }
}
