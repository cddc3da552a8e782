//! Component locator port
//!
//! Factories often need "the `T` on my node or somewhere below it". The
//! search itself belongs to the host scene; this trait is the seam.

use crate::error::{Error, Result};
use std::any::type_name;
use std::sync::Arc;

/// Host-side search for components attached to scene nodes
pub trait ComponentLocator {
    /// Node handle of the host scene
    type Node;

    /// Depth-first search starting at `root` (self first, then children in
    /// order). Nodes rejected by `predicate` are skipped as candidates but
    /// their children are still searched.
    fn try_locate<T: Send + Sync + 'static>(
        &self,
        root: &Self::Node,
        predicate: Option<&dyn Fn(&Self::Node) -> bool>,
    ) -> Option<Arc<T>>;

    /// Like [`try_locate`](Self::try_locate) but a miss is an error
    fn locate<T: Send + Sync + 'static>(
        &self,
        root: &Self::Node,
        predicate: Option<&dyn Fn(&Self::Node) -> bool>,
    ) -> Result<Arc<T>> {
        self.try_locate::<T>(root, predicate).ok_or_else(|| {
            Error::not_found(format!("component of type {}", type_name::<T>()))
        })
    }
}
