//! The per-compilation dependency manager (spec.md §4.3).

use crate::ir::{IrType, IrValue, ModuleBuilder};
use crate::memref::{decode_result, ptensor_words, DecodedResult};
use crate::type_synthesis::synthesize_type;
use indexmap::IndexMap;
use ndrt_registry::Registry;
use ndrt_types::{CoreError, Guid};
use std::collections::HashMap;
use tracing::trace;

/// One fully-decoded delivered result, handed to a node's delivery
/// callback. `result` is `Local` for local/0-rank arrays (halo and
/// local-offset fields are absent, matching "passed as null" in
/// spec.md §4.3) and `Distributed` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredArray {
    pub guid: Guid,
    pub rank: u32,
    pub is_distributed: bool,
    pub result: DecodedResult,
}

pub type DeliveryCallback = Box<dyn FnMut(DeliveredArray) + Send>;
pub type ReadyCallback = Box<dyn FnMut(Guid) + Send>;

/// Per-batch bookkeeping described in spec.md §3 ("Dependency manager
/// state") and §4.3. A fresh `DependencyManager` is created per
/// compilation batch (spec.md §4.2) and discarded once `deliver` returns
/// or the batch aborts.
pub struct DependencyManager {
    /// `guid -> value` for values produced inside the current function
    /// body (by `get_dependent` or `add_value`). Insertion order defines
    /// argument index, result index, and delivery order (spec.md §8
    /// property 1).
    ivm: IndexMap<Guid, IrValue>,
    /// Types for entries added via `add_value` (producer results); entries
    /// imported via `get_dependent` never need one here because they are
    /// cleared from `ivm` by `store_inputs` before `handle_result` runs.
    result_types: HashMap<Guid, IrType>,
    /// Ordered `(guid, future)` pairs for inputs imported as function
    /// arguments, in resolution order.
    args: Vec<(Guid, std::sync::Arc<dyn ndrt_types::ArrayFuture>)>,
    /// `guid -> delivery callback`.
    icm: HashMap<Guid, DeliveryCallback>,
    /// `guid -> ordered ready-signal callbacks`.
    icr: HashMap<Guid, Vec<ReadyCallback>>,
    /// `guid -> (rank, is_distributed)`, captured at `handle_result` and
    /// consumed by `deliver`.
    irm: HashMap<Guid, (u32, bool)>,
}

impl Default for DependencyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyManager {
    pub fn new() -> Self {
        Self {
            ivm: IndexMap::new(),
            result_types: HashMap::new(),
            args: Vec::new(),
            icm: HashMap::new(),
            icr: HashMap::new(),
            irm: HashMap::new(),
        }
    }

    /// Resolve `guid` to a value usable inside the function body being
    /// built. If it is already bound (produced earlier in this batch),
    /// returns the recorded value. Otherwise it must be resolvable via the
    /// Registry; a fresh function argument is synthesized, appended to
    /// `args`, and recorded (spec.md §8 property 4: one argument per
    /// unbound dependency, exactly).
    pub fn get_dependent(
        &mut self,
        builder: &mut dyn ModuleBuilder,
        registry: &Registry,
        guid: Guid,
    ) -> Result<IrValue, CoreError> {
        if let Some(value) = self.ivm.get(&guid) {
            return Ok(*value);
        }

        let future = registry.get(guid).map_err(|_| CoreError::UnknownGuid(guid))?;
        let desc = future.descriptor();
        let ty = synthesize_type(&desc);
        let value = builder.add_argument(ty);
        trace!(%guid, "depmgr: imported dependency as function argument");

        self.args.push((guid, future));
        self.ivm.insert(guid, value);
        Ok(value)
    }

    /// Record a value this batch produced for `guid`, together with the
    /// type it should be returned as (if it survives to `handle_result`)
    /// and the callback that will receive its decoded result.
    ///
    /// Precondition: `guid` must not already be bound in this batch.
    /// Violating it is a programming error (spec.md §7,
    /// `InvariantViolation`), not a recoverable condition.
    pub fn add_value(
        &mut self,
        guid: Guid,
        value: IrValue,
        ty: IrType,
        delivery_cb: DeliveryCallback,
    ) -> Result<(), CoreError> {
        if self.ivm.contains_key(&guid) {
            return Err(CoreError::InvariantViolation(format!(
                "add_value called twice for {guid}"
            )));
        }
        self.ivm.insert(guid, value);
        self.result_types.insert(guid, ty);
        self.icm.insert(guid, delivery_cb);
        Ok(())
    }

    /// Register a callback fired after execution, regardless of whether
    /// `guid` is among the results.
    pub fn add_ready(&mut self, guid: Guid, ready_cb: ReadyCallback) {
        self.icr.entry(guid).or_default().push(ready_cb);
    }

    /// End-of-life for `guid` inside the current batch (spec.md §4.3
    /// `drop(guid)`, seed scenario S1's `drop(a); drop(b)`): removes it
    /// from `ivm`/`result_types`/`icm`/`icr` so a value this batch
    /// produced earlier is excluded from `handle_result`/`deliver` even
    /// though nothing downstream ever resolved it. A no-op for a guid
    /// this batch never bound. This only ever touches batch-local
    /// bookkeeping — a node calls it from inside `emit`, which is handed
    /// `&Registry`, not `&mut Registry` (node.rs). Dropping a guid from
    /// the Registry itself, once it is no longer batch-local, is
    /// `Runtime::drop`'s job.
    pub fn drop_local(&mut self, guid: Guid) {
        self.ivm.shift_remove(&guid);
        self.result_types.remove(&guid);
        self.icm.remove(&guid);
        self.icr.remove(&guid);
        trace!(%guid, "depmgr: drop_local");
    }

    /// Materialise every imported argument's flat memref words, in
    /// resolution order, into one flat pointer list matching the
    /// function's native-code argument layout. Clears the corresponding
    /// `ivm` entries (they need no delivery) and releases the held
    /// futures.
    pub fn store_inputs(&mut self) -> Vec<usize> {
        let mut words = Vec::new();
        for (guid, future) in self.args.drain(..) {
            future.add_to_args(&mut words);
            self.ivm.shift_remove(&guid);
        }
        words
    }

    /// Finalise the return value list from whatever remains in `ivm`
    /// after `store_inputs` (i.e. values this batch actually produced),
    /// in insertion order. Extends the function signature via `builder`,
    /// records `(rank, is_distributed)` for each result in `irm`, and
    /// emits the return operation. Returns `2 * total_words` as a safe
    /// upper bound for the caller-allocated output buffer (SPEC_FULL §2:
    /// `deliver` always decodes the exact count from `irm`, never this
    /// bound).
    pub fn handle_result(&mut self, builder: &mut dyn ModuleBuilder) -> usize {
        let mut total_words = 0usize;
        for (guid, value) in self.ivm.iter() {
            let ty = self
                .result_types
                .get(guid)
                .expect("every surviving ivm entry at handle_result must have a recorded type");
            builder.add_result(ty.clone(), *value);
            let rank = ty.rank();
            let is_dist = ty.is_distributed();
            self.irm.insert(*guid, (rank, is_dist));
            total_words += ptensor_words(rank, is_dist);
        }
        builder.emit_return();
        2 * total_words
    }

    /// Walk `ivm` in the same order `handle_result` used, slicing the
    /// expected word count off `flat_output` for each guid (per `irm`)
    /// and invoking its delivery callback. Fires every ready callback
    /// afterwards.
    pub fn deliver(&mut self, flat_output: &[usize]) -> Result<(), CoreError> {
        let mut cursor = flat_output;
        for (guid, _value) in self.ivm.iter() {
            let (rank, is_distributed) = *self
                .irm
                .get(guid)
                .ok_or_else(|| CoreError::InvariantViolation(format!("missing irm entry for {guid}")))?;
            let (result, rest) = decode_result(cursor, rank, is_distributed);
            cursor = rest;

            if let Some(cb) = self.icm.get_mut(guid) {
                cb(DeliveredArray {
                    guid: *guid,
                    rank,
                    is_distributed,
                    result,
                });
            }
        }

        for (guid, callbacks) in self.icr.iter_mut() {
            for cb in callbacks.iter_mut() {
                cb(*guid);
            }
        }

        self.ivm.clear();
        self.result_types.clear();
        self.icm.clear();
        self.icr.clear();
        self.irm.clear();
        Ok(())
    }

    /// Number of `(guid, future)` pairs pending in `args`. Exposed for
    /// tests verifying the argument/dependency bijection (spec.md §8
    /// property 4).
    pub fn pending_arg_count(&self) -> usize {
        self.args.len()
    }

    /// Snapshot of the current `ivm` insertion order. Exposed for tests
    /// verifying stable ordering (spec.md §8 property 1).
    pub fn ivm_order(&self) -> Vec<Guid> {
        self.ivm.keys().copied().collect()
    }
}
