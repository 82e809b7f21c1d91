//! Opaque distributed-team identity.

use serde::{Deserialize, Serialize};

/// Opaque communicator identity for a distributed array. `0` means
/// "non-distributed"; any other value is an opaque handle owned by the
/// transceiver, which is out of scope for this crate (spec.md §1: "the
/// transceiver ... treated as an opaque handle").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(u64);

impl TeamId {
    /// The non-distributed sentinel.
    pub const NONE: TeamId = TeamId(0);

    pub const fn from_raw(raw: u64) -> Self {
        TeamId(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// `false` for `TeamId::NONE`.
    pub const fn is_distributed(self) -> bool {
        self.0 != 0
    }
}

impl Default for TeamId {
    fn default() -> Self {
        TeamId::NONE
    }
}
