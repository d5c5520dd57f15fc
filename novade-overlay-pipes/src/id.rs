//! Identifiers of pipe and rotator instances.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identifier of one pipe or rotator instance.
///
/// A resource keeps its id for its whole life, including while it is moved
/// between resource holders, so ids are how callers observe identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Creates a new, unique `ResourceId` from a global counter.
    pub fn new_unique() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        ResourceId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
