//! The process-wide facade described in spec.md §9 ("Global state"):
//! Registry, deferred queue, and JIT engine, all behind `init()`/`fini()`
//! so teardown can run before the shared libraries backing compiled
//! code are unloaded.

mod error;

pub use error::RuntimeError;

use ndrt_graph::{BatchReport, DeferredNode, DeferredQueue, Scheduler};
use ndrt_jit::{JitBackend, JitEngine};
use ndrt_registry::Registry;
use ndrt_types::{ArrayFuture, Guid, JitConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

/// One process's worth of runtime state. The Registry, queue, and JIT
/// engine are process-wide singletons in spec terms; nothing here
/// prevents constructing more than one for tests, but production code
/// is expected to hold exactly one behind `init()`/`fini()`.
pub struct Runtime<B: JitBackend> {
    registry: Mutex<Registry>,
    queue: DeferredQueue,
    scheduler: Scheduler<B>,
    initialized: AtomicBool,
}

impl<B: JitBackend> Runtime<B> {
    /// Construct without initialising. Dialect registration, pass
    /// pipeline assembly, and shared-library path resolution all happen
    /// eagerly here (mirroring `JitEngine::new`); `init()` only flips the
    /// ready flag and is the point front-ends should wait for.
    pub fn new(backend: B, config: JitConfig) -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
            queue: DeferredQueue::new(),
            scheduler: Scheduler::new(JitEngine::new(backend, config)),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn init(&self) {
        self.initialized.store(true, Ordering::SeqCst);
        info!("runtime: initialised");
    }

    /// Release readiness. Per spec.md §9, callers must run this before
    /// unloading the shared libraries the compiled code's symbols live
    /// in; this type does not itself unload anything (that is the
    /// embedder's responsibility, out of scope here).
    pub fn fini(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        info!("runtime: torn down");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn require_initialized(&self) -> Result<(), RuntimeError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(RuntimeError::NotInitialized)
        }
    }

    /// Register an already-materialised array, returning its fresh guid.
    pub fn put(&self, future: Arc<dyn ArrayFuture>) -> Result<Guid, RuntimeError> {
        self.require_initialized()?;
        Ok(self.registry.lock().expect("registry lock poisoned").put(future))
    }

    /// Release a guid: removes it from the Registry immediately (spec.md
    /// §4.3 `drop(guid)`, seed scenario S5 — a guid dropped between
    /// batches resolves as `UnknownGuid` the next time anything tries to
    /// depend on it). For a guid a batch produced and drops before its
    /// own `handle_result`, use `DependencyManager::drop_local` from
    /// inside that node's `emit` instead; this method is for guids
    /// already Registry-resident between batches, mirroring `put`'s
    /// direct registry access.
    pub fn drop(&self, guid: Guid) -> Result<(), RuntimeError> {
        self.require_initialized()?;
        Ok(self.registry.lock().expect("registry lock poisoned").del(guid)?)
    }

    /// Append a deferred node to the queue. Callable from any thread
    /// (spec.md §5); the queue itself is the synchronisation point.
    pub fn enqueue(&self, node: Box<dyn DeferredNode>) -> Result<(), RuntimeError> {
        self.require_initialized()?;
        self.queue.push(node);
        Ok(())
    }

    /// Push an explicit batch boundary.
    pub fn mark_run(&self) -> Result<(), RuntimeError> {
        self.require_initialized()?;
        self.queue.push_run();
        Ok(())
    }

    /// Drain and execute exactly one batch from the queue.
    pub fn drain(&self) -> Result<BatchReport, RuntimeError> {
        self.require_initialized()?;
        let mut registry = self.registry.lock().expect("registry lock poisoned");
        Ok(self.scheduler.drain_batch(&self.queue, &mut registry)?)
    }

    pub fn scheduler(&self) -> &Scheduler<B> {
        &self.scheduler
    }
}
