//! Dependency lifetime policies

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// How a container produces and caches the value of a dependency.
///
/// | Lifetime | Factory invoked | Cached |
/// |----------|-----------------|--------|
/// | `Singleton` | once, eagerly at registration | forever |
/// | `Transient` | on every resolution | never |
/// | `Shared` | when the reference count is zero | while references remain |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Lifetime {
    /// One instance for the life of the container
    Singleton,
    /// A new (or forwarded) instance per request
    Transient,
    /// Reference counted, reconstructed on first demand after reaching zero
    Shared,
}

impl Lifetime {
    /// All supported lifetimes
    pub const ALL: [Lifetime; 3] = [Lifetime::Singleton, Lifetime::Transient, Lifetime::Shared];

    /// Lowercase tag used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Singleton => "singleton",
            Self::Transient => "transient",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lifetime {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        match tag.trim().to_lowercase().as_str() {
            "singleton" => Ok(Self::Singleton),
            "transient" => Ok(Self::Transient),
            "shared" => Ok(Self::Shared),
            _ => Err(Error::unknown_lifetime(tag)),
        }
    }
}
