//! The deferred-node contract (spec.md §3, "Deferred node").

use ndrt_depmgr::{DependencyManager, ModuleBuilder};
use ndrt_registry::Registry;
use ndrt_types::{CoreError, DType, Guid, NOGUID};

/// A promise + emit-capability pair queued by a front-end operation.
///
/// Invariants this workspace relies on (spec.md §3):
/// - `guid()` is in the Registry from the moment the node is queued until
///   it is dropped.
/// - If `emit` registers a value with the dependency manager, it MUST
///   also register a delivery callback on the same call.
/// - Input dependencies are referenced by guid only; a node never holds
///   a direct pointer to another node.
pub trait DeferredNode: Send {
    /// The node's output guid, or `NOGUID` if it produces no array
    /// (e.g. a pure side-effecting op).
    fn guid(&self) -> Guid {
        NOGUID
    }

    fn dtype(&self) -> DType;

    fn rank(&self) -> u32;

    /// Whether the output's distribution (if any) is evenly balanced.
    /// Read by the scheduler before `emit` (`BatchReport::unbalanced_nodes`).
    fn balanced(&self) -> bool {
        true
    }

    /// Small enum tag used for serialization only; opaque to the
    /// scheduler.
    fn factory_id(&self) -> u32;

    /// Optional eager path: fallback execution, or non-tensor ops that
    /// never go through the compiler at all. Default no-op for nodes
    /// that are always compiled.
    fn run(&mut self) {}

    /// Compiler-building path. Returns `Ok(true)` iff the node declines
    /// JIT and must be run eagerly instead — the scheduler then flushes
    /// whatever has already been emitted, runs this node via `run()`,
    /// and starts a fresh module for the remaining queue (spec.md §4.2,
    /// seed scenario S6). An `Err` (e.g. an unresolvable dependency) is
    /// fatal for the whole batch (spec.md §7) without panicking the
    /// worker.
    fn emit(
        &mut self,
        builder: &mut dyn ModuleBuilder,
        dm: &mut DependencyManager,
        registry: &Registry,
    ) -> Result<bool, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndrt_depmgr::{IrType, IrValue};

    struct AlwaysEager;
    impl DeferredNode for AlwaysEager {
        fn dtype(&self) -> DType {
            DType::Int32
        }
        fn rank(&self) -> u32 {
            0
        }
        fn factory_id(&self) -> u32 {
            1
        }
        fn emit(
            &mut self,
            _b: &mut dyn ModuleBuilder,
            _dm: &mut DependencyManager,
            _r: &Registry,
        ) -> Result<bool, CoreError> {
            Ok(true)
        }
    }

    struct RecordingBuilder(Vec<IrType>);
    impl ModuleBuilder for RecordingBuilder {
        fn add_argument(&mut self, ty: IrType) -> IrValue {
            self.0.push(ty);
            IrValue(self.0.len() - 1)
        }
        fn add_result(&mut self, _ty: IrType, _value: IrValue) {}
        fn emit_return(&mut self) {}
    }

    #[test]
    fn default_guid_is_noguid_and_default_run_is_noop() {
        let mut node = AlwaysEager;
        assert_eq!(node.guid(), NOGUID);
        node.run(); // must not panic
        let mut builder = RecordingBuilder(Vec::new());
        let mut dm = DependencyManager::new();
        let registry = Registry::new();
        assert!(node.emit(&mut builder, &mut dm, &registry).unwrap());
    }
}
