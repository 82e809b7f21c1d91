//! The array-handle "future" contract (spec.md §3).
//!
//! `ArrayFuture` is the seam between this runtime core and the front-end
//! operation library: the core never inspects an array's payload directly,
//! only its metadata (dtype, rank, device, team) and its ability to
//! materialise itself as a flat ABI argument. Concrete array
//! implementations, element-type dispatch, and device buffer management
//! all live on the other side of this trait and are out of scope here
//! (spec.md §1).

use crate::dtype::DType;
use crate::guid::Guid;
use crate::team::TeamId;

/// Metadata describing an array handle, independent of its backing
/// storage. Cheap to copy; used for type synthesis (spec.md §4.3) without
/// needing to touch the handle itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDescriptor {
    pub guid: Guid,
    pub dtype: DType,
    pub rank: u32,
    /// Empty string means host (CPU); non-empty is a device tag understood
    /// by the front-end (e.g. a GPU ordinal), opaque to the core.
    pub device: String,
    pub team: TeamId,
}

impl ArrayDescriptor {
    pub fn is_distributed(&self) -> bool {
        self.team.is_distributed() && self.rank > 0
    }

    pub fn is_distributed_scalar(&self) -> bool {
        self.team.is_distributed() && self.rank == 0
    }

    pub fn is_local(&self) -> bool {
        !self.team.is_distributed()
    }

    pub fn on_device(&self) -> bool {
        !self.device.is_empty()
    }
}

/// Opaque array handle. The core only ever calls `descriptor()` (to decide
/// how to synthesize a function argument type) and `add_to_args()` (to
/// marshal the handle across the native-code ABI at invocation time);
/// everything else about the array's storage is the front-end's concern.
pub trait ArrayFuture: std::fmt::Debug + Send + Sync {
    /// Metadata needed for type synthesis and bookkeeping.
    fn descriptor(&self) -> ArrayDescriptor;

    /// Append this handle's flat memref descriptor words, in native-code
    /// ABI order, to `words`. Called by the dependency manager's
    /// `store_inputs` (spec.md §4.3) once per unbound input, immediately
    /// before invocation.
    fn add_to_args(&self, words: &mut Vec<usize>);
}
