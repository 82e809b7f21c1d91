//! Batch-level error taxonomy (spec.md §7). The core never retries;
//! any of these aborts the current batch, clears its dependency-manager
//! state, and is reported — the Registry itself survives.

use ndrt_types::CoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Jit(#[from] ndrt_jit::JitError),
}
