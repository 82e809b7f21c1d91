//! Process-unique ids for array handles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Reserved sentinel meaning "no array".
pub const NOGUID: Guid = Guid(0);

/// A monotonic, process-unique id identifying one logical array.
///
/// `Guid` is `Copy` and carries no lifetime: deferred nodes reference their
/// predecessors by `Guid` rather than by a pointer into the node graph, so
/// the graph can never form a reference cycle (design note in spec.md §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Guid(u64);

impl Guid {
    /// Wrap a raw id. Only the allocator (`GuidAllocator`) and test code
    /// should construct guids directly.
    pub const fn from_raw(raw: u64) -> Self {
        Guid(raw)
    }

    /// The underlying integer value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// True for the reserved `NOGUID` sentinel.
    pub const fn is_none(self) -> bool {
        self.0 == NOGUID.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

impl Default for Guid {
    fn default() -> Self {
        NOGUID
    }
}

/// Monotonic allocator handing out fresh, process-unique guids.
///
/// A single allocator lives inside the Registry (spec.md §4.1); it is never
/// shared beyond that so there is exactly one source of truth for "has this
/// id been handed out yet".
#[derive(Debug)]
pub struct GuidAllocator {
    next: AtomicU64,
}

impl GuidAllocator {
    /// Create an allocator whose first `alloc()` call returns guid 1
    /// (0 is reserved for `NOGUID`).
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocate the next guid. Safe to call concurrently.
    pub fn alloc(&self) -> Guid {
        Guid(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for GuidAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noguid_is_none() {
        assert!(NOGUID.is_none());
        assert!(!Guid::from_raw(1).is_none());
    }

    #[test]
    fn allocator_is_monotonic_and_skips_zero() {
        let alloc = GuidAllocator::new();
        let a = alloc.alloc();
        let b = alloc.alloc();
        let c = alloc.alloc();
        assert!(a.raw() > 0);
        assert!(b.raw() > a.raw());
        assert!(c.raw() > b.raw());
    }

    #[test]
    fn display_format() {
        assert_eq!(Guid::from_raw(7).to_string(), "g7");
    }
}
