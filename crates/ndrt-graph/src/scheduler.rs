//! The single worker that drains the deferred queue (spec.md §4.2).
//!
//! For each batch: open a module, emit every node in FIFO order,
//! flush-and-run-eagerly for any node that declines JIT, then finalise
//! the remainder through the dependency manager and the JIT engine.

use crate::error::BatchError;
use crate::node::DeferredNode;
use crate::queue::DeferredQueue;
use ndrt_depmgr::DependencyManager;
use ndrt_jit::{JitBackend, JitEngine};
use ndrt_registry::Registry;
use tracing::{info, trace};

/// Outcome of draining one batch: how many nodes went through the
/// compiler versus ran eagerly, and how many separate compile+invoke
/// cycles the eager-fallback flushing produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub compiled_nodes: usize,
    pub eager_nodes: usize,
    pub compile_cycles: usize,
    /// Count of nodes in this batch whose `balanced()` reported `false`
    /// (an unevenly-distributed output). Diagnostic only: nothing in
    /// this workspace reshapes work based on it, since no real
    /// distributed backend is linked in (spec.md §1), but the scheduler
    /// is the one place every node's declared metadata passes through.
    pub unbalanced_nodes: usize,
}

/// Owns the JIT engine and drives the Registry + queue through one
/// worker loop. Not `Sync`: per spec.md §5 this type is only ever
/// touched from the single worker thread.
pub struct Scheduler<B: JitBackend> {
    engine: JitEngine<B>,
}

impl<B: JitBackend> Scheduler<B> {
    pub fn new(engine: JitEngine<B>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &JitEngine<B> {
        &self.engine
    }

    /// Drain one batch from `queue`, running every node against
    /// `registry`. Ordering guarantee (spec.md §5): emission order
    /// equals FIFO order equals return order equals delivery order.
    pub fn drain_batch(&self, queue: &DeferredQueue, registry: &mut Registry) -> Result<BatchReport, BatchError> {
        let nodes = queue.pop_batch();
        let mut report = BatchReport::default();

        let mut builder = self.engine.open_module();
        let mut dm = DependencyManager::new();
        let mut has_pending_emits = false;

        for mut node in nodes {
            if !node.balanced() {
                report.unbalanced_nodes += 1;
                trace!(factory_id = node.factory_id(), "scheduler: node declares an unbalanced distribution");
            }
            let declines = node.emit(&mut builder, &mut dm, registry)?;
            if declines {
                trace!("scheduler: node declined jit, flushing");
                self.finalise(builder, &mut dm, &mut report)?;
                node.run();
                report.eager_nodes += 1;
                builder = self.engine.open_module();
                has_pending_emits = false;
            } else {
                report.compiled_nodes += 1;
                has_pending_emits = true;
            }
        }

        if has_pending_emits || report.compile_cycles == 0 {
            self.finalise(builder, &mut dm, &mut report)?;
        }

        info!(
            compiled = report.compiled_nodes,
            eager = report.eager_nodes,
            cycles = report.compile_cycles,
            "scheduler: batch drained"
        );
        Ok(report)
    }

    fn finalise(
        &self,
        builder: B::Builder,
        dm: &mut DependencyManager,
        report: &mut BatchReport,
    ) -> Result<(), BatchError> {
        let mut builder = builder;
        let inputs = dm.store_inputs();
        let output_words = dm.handle_result(&mut builder);
        let engine = self.engine.compile(builder)?;
        let output = self.engine.invoke(&engine, &inputs, output_words)?;
        dm.deliver(&output)?;
        report.compile_cycles += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndrt_depmgr::{synthesize_type, DeliveredArray, ModuleBuilder};
    use ndrt_jit::NullBackend;
    use ndrt_types::{ArrayDescriptor, ArrayFuture, DType, Guid, JitConfig, TeamId};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct LocalScalar(ArrayDescriptor);
    impl ArrayFuture for LocalScalar {
        fn descriptor(&self) -> ArrayDescriptor {
            self.0.clone()
        }
        fn add_to_args(&self, words: &mut Vec<usize>) {
            words.extend_from_slice(&[1, 1, 0]); // rank-0 memref
        }
    }

    fn desc(guid: u64) -> ArrayDescriptor {
        ArrayDescriptor {
            guid: Guid::from_raw(guid),
            dtype: DType::Int64,
            rank: 0,
            device: String::new(),
            team: TeamId::NONE,
        }
    }

    struct ProducerNode {
        output_guid: Guid,
        delivered: Arc<Mutex<Vec<Guid>>>,
    }
    impl DeferredNode for ProducerNode {
        fn guid(&self) -> Guid {
            self.output_guid
        }
        fn dtype(&self) -> DType {
            DType::Int64
        }
        fn rank(&self) -> u32 {
            0
        }
        fn factory_id(&self) -> u32 {
            1
        }
        fn emit(
            &mut self,
            builder: &mut dyn ModuleBuilder,
            dm: &mut DependencyManager,
            _r: &Registry,
        ) -> Result<bool, ndrt_types::CoreError> {
            let ty = synthesize_type(&desc(self.output_guid.raw()));
            let value = builder.add_argument(ty.clone());
            let delivered = self.delivered.clone();
            let guid = self.output_guid;
            dm.add_value(
                guid,
                value,
                ty,
                Box::new(move |_d: DeliveredArray| {
                    delivered.lock().unwrap().push(guid);
                }),
            )?;
            Ok(false)
        }
    }

    struct EagerNode {
        ran: Arc<Mutex<bool>>,
    }
    impl DeferredNode for EagerNode {
        fn dtype(&self) -> DType {
            DType::Bool
        }
        fn rank(&self) -> u32 {
            0
        }
        fn factory_id(&self) -> u32 {
            2
        }
        fn run(&mut self) {
            *self.ran.lock().unwrap() = true;
        }
        fn emit(
            &mut self,
            _b: &mut dyn ModuleBuilder,
            _dm: &mut DependencyManager,
            _r: &Registry,
        ) -> Result<bool, ndrt_types::CoreError> {
            Ok(true)
        }
    }

    struct UnbalancedNode {
        output_guid: Guid,
        delivered: Arc<Mutex<Vec<Guid>>>,
    }
    impl DeferredNode for UnbalancedNode {
        fn guid(&self) -> Guid {
            self.output_guid
        }
        fn dtype(&self) -> DType {
            DType::Int64
        }
        fn rank(&self) -> u32 {
            1
        }
        fn balanced(&self) -> bool {
            false
        }
        fn factory_id(&self) -> u32 {
            3
        }
        fn emit(
            &mut self,
            builder: &mut dyn ModuleBuilder,
            dm: &mut DependencyManager,
            _r: &Registry,
        ) -> Result<bool, ndrt_types::CoreError> {
            let ty = synthesize_type(&desc(self.output_guid.raw()));
            let value = builder.add_argument(ty.clone());
            let delivered = self.delivered.clone();
            let guid = self.output_guid;
            dm.add_value(
                guid,
                value,
                ty,
                Box::new(move |_d: DeliveredArray| {
                    delivered.lock().unwrap().push(guid);
                }),
            )?;
            Ok(false)
        }
    }

    fn scheduler() -> Scheduler<NullBackend> {
        let engine = JitEngine::new(NullBackend::new(), JitConfig::from_map(&HashMap::new()).unwrap());
        Scheduler::new(engine)
    }

    #[test]
    fn batch_with_only_compiled_nodes_delivers_once() {
        let sched = scheduler();
        let mut registry = Registry::new();
        let queue = DeferredQueue::new();
        let delivered = Arc::new(Mutex::new(Vec::new()));

        let guid = Guid::from_raw(1);
        registry.put_at(guid, Arc::new(LocalScalar(desc(1))));
        queue.push(Box::new(ProducerNode {
            output_guid: guid,
            delivered: delivered.clone(),
        }));

        let report = sched.drain_batch(&queue, &mut registry).unwrap();
        assert_eq!(report.compiled_nodes, 1);
        assert_eq!(report.eager_nodes, 0);
        assert_eq!(report.compile_cycles, 1);
        assert_eq!(*delivered.lock().unwrap(), vec![guid]);
        assert_eq!(report.unbalanced_nodes, 0);
    }

    #[test]
    fn unbalanced_node_is_counted_but_still_compiled() {
        let sched = scheduler();
        let mut registry = Registry::new();
        let queue = DeferredQueue::new();
        let delivered = Arc::new(Mutex::new(Vec::new()));

        queue.push(Box::new(UnbalancedNode {
            output_guid: Guid::from_raw(1),
            delivered: delivered.clone(),
        }));

        let report = sched.drain_batch(&queue, &mut registry).unwrap();
        assert_eq!(report.compiled_nodes, 1);
        assert_eq!(report.unbalanced_nodes, 1);
    }

    #[test]
    fn eager_node_flushes_and_runs_between_compile_cycles() {
        let sched = scheduler();
        let mut registry = Registry::new();
        let queue = DeferredQueue::new();
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let ran = Arc::new(Mutex::new(false));

        let guid = Guid::from_raw(1);
        registry.put_at(guid, Arc::new(LocalScalar(desc(1))));
        queue.push(Box::new(ProducerNode {
            output_guid: guid,
            delivered: delivered.clone(),
        }));
        queue.push(Box::new(EagerNode { ran: ran.clone() }));

        let report = sched.drain_batch(&queue, &mut registry).unwrap();
        assert_eq!(report.compiled_nodes, 1);
        assert_eq!(report.eager_nodes, 1);
        assert_eq!(report.compile_cycles, 1, "the eager node's own flush already finalised everything");
        assert!(*ran.lock().unwrap());
        assert_eq!(*delivered.lock().unwrap(), vec![guid]);
    }

    #[test]
    fn empty_batch_still_performs_one_trivial_compile_cycle() {
        let sched = scheduler();
        let mut registry = Registry::new();
        let queue = DeferredQueue::new();
        let report = sched.drain_batch(&queue, &mut registry).unwrap();
        assert_eq!(report.compile_cycles, 1);
        assert_eq!(report.compiled_nodes, 0);
    }
}
