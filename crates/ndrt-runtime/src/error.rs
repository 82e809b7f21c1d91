//! The facade's aggregate error type (spec.md §7). Every per-crate error
//! taxonomy below this surfaces through here so a front-end only needs
//! to match on one enum.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("runtime used before init() or after fini()")]
    NotInitialized,

    #[error(transparent)]
    Batch(#[from] ndrt_graph::BatchError),

    #[error(transparent)]
    Registry(#[from] ndrt_registry::RegistryError),
}
