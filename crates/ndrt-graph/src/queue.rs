//! FIFO of runnables, drained by the single worker in batches (spec.md
//! §4.2). Front-ends append from any thread; the queue is the sole
//! synchronisation point (spec.md §5).

use crate::node::DeferredNode;
use std::collections::VecDeque;
use std::sync::Mutex;

enum Entry {
    Node(Box<dyn DeferredNode>),
    /// Explicit batch boundary.
    Run,
}

/// Thread-safe FIFO. Batch boundaries are an explicit `RUN` sentinel or
/// queue quiescence (the queue simply runs dry): `pop_batch` drains
/// everything up to the next sentinel, or to the end if none is queued.
#[derive(Default)]
pub struct DeferredQueue {
    entries: Mutex<VecDeque<Entry>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Append a node to the back of the queue.
    pub fn push(&self, node: Box<dyn DeferredNode>) {
        self.entries.lock().expect("deferred queue lock poisoned").push_back(Entry::Node(node));
    }

    /// Append an explicit batch boundary.
    pub fn push_run(&self) {
        self.entries.lock().expect("deferred queue lock poisoned").push_back(Entry::Run);
    }

    /// Drain one batch: every node up to (and consuming) the next `RUN`
    /// sentinel, or the whole queue if it runs dry first.
    pub fn pop_batch(&self) -> Vec<Box<dyn DeferredNode>> {
        let mut entries = self.entries.lock().expect("deferred queue lock poisoned");
        let mut batch = Vec::new();
        while let Some(entry) = entries.pop_front() {
            match entry {
                Entry::Node(node) => batch.push(node),
                Entry::Run => break,
            }
        }
        batch
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("deferred queue lock poisoned").is_empty()
    }
}
