//! Value Objects
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DependencyKey`] | Runtime type tag indexing descriptors and filters |
//! | [`Lifetime`] | Singleton / Transient / Shared policy |
//! | [`Filter`] | Live instances of one lifecycle type |

pub mod filter;
pub mod key;
pub mod lifetime;

pub use filter::{AnyFilter, Filter};
pub use key::DependencyKey;
pub use lifetime::Lifetime;
