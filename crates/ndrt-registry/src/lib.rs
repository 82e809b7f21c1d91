//! The process-wide registry mapping guids to array-handle futures
//! (spec.md §4.1).
//!
//! Mutated by the scheduler's worker thread only; front-end operations
//! enqueue deferred nodes that carry guids, they never touch the registry
//! directly (spec.md §5, "Concurrency").

use ndrt_types::{ArrayFuture, Guid, GuidAllocator};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Errors raised by registry operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown guid: {0}")]
    UnknownGuid(Guid),

    /// `del` called twice for the same guid. Not fatal (SPEC_FULL §2):
    /// the second call is reported but does not abort the batch.
    #[error("guid already dropped: {0}")]
    DoubleDrop(Guid),
}

/// Process-wide `guid -> future` map plus the allocator that mints fresh
/// guids. There is exactly one of these per process; the scheduler owns
/// it and the dependency manager borrows it to resolve unbound inputs.
#[derive(Debug, Default)]
pub struct Registry {
    allocator: GuidAllocator,
    entries: HashMap<Guid, Arc<dyn ArrayFuture>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            allocator: GuidAllocator::new(),
            entries: HashMap::new(),
        }
    }

    /// Allocate a fresh guid and register `future` under it.
    pub fn put(&mut self, future: Arc<dyn ArrayFuture>) -> Guid {
        let guid = self.allocator.alloc();
        trace!(%guid, "registry: put");
        self.entries.insert(guid, future);
        guid
    }

    /// Insert a future under a guid that was already allocated elsewhere
    /// (used by deferred nodes that mint their own output guid up front so
    /// they can reference it while still being enqueued).
    pub fn put_at(&mut self, guid: Guid, future: Arc<dyn ArrayFuture>) {
        trace!(%guid, "registry: put_at");
        self.entries.insert(guid, future);
    }

    /// Look up a future by guid.
    pub fn get(&self, guid: Guid) -> Result<Arc<dyn ArrayFuture>, RegistryError> {
        trace!(%guid, "registry: get");
        self.entries
            .get(&guid)
            .cloned()
            .ok_or(RegistryError::UnknownGuid(guid))
    }

    /// True if `guid` is currently registered.
    pub fn contains(&self, guid: Guid) -> bool {
        self.entries.contains_key(&guid)
    }

    /// Remove a guid from the registry. A guid that is not present is
    /// reported as `DoubleDrop` rather than silently ignored or treated as
    /// fatal (SPEC_FULL §2) — callers that don't care may discard the
    /// error.
    pub fn del(&mut self, guid: Guid) -> Result<(), RegistryError> {
        trace!(%guid, "registry: del");
        if self.entries.remove(&guid).is_some() {
            Ok(())
        } else {
            Err(RegistryError::DoubleDrop(guid))
        }
    }

    /// Number of live entries. Exposed for tests and diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
