//! The error taxonomy shared across the runtime (spec.md §7).
//!
//! Individual crates define their own narrow error enum scoped to their own
//! responsibility and fold cross-cutting cases in from here with
//! `#[from]`; this mirrors the reference codebase's split between a small
//! per-crate `thiserror` enum (e.g. `esper_compiler::CompilerError`) and a
//! facade-level aggregate.

use crate::guid::Guid;
use thiserror::Error;

/// Errors common to every stage of the pipeline. Per spec.md §7, none of
/// these are retried: they abort the current batch and are reported.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Dispatch on an out-of-range dtype tag.
    #[error("unknown dtype tag: {0}")]
    UnknownDtype(u8),

    /// Registry lookup miss when resolving a dependency.
    #[error("unknown guid: {0}")]
    UnknownGuid(Guid),

    /// The pass pipeline reported failure.
    #[error("pass pipeline failed at stage `{stage}`")]
    PassFailure { stage: String },

    /// Execution engine construction failed.
    #[error("compilation failed: {0}")]
    CompileFailure(String),

    /// The packed entry symbol was not found in the compiled module.
    #[error("entry point not found: {0}")]
    LookupFailure(String),

    /// A programming-error invariant was violated (e.g. double `add_value`).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl CoreError {
    /// Whether this class of error is one the process should treat as
    /// fatal to the whole run rather than just the current batch.
    /// `InvariantViolation` indicates a programming error and may abort;
    /// everything else is fatal for the batch only (spec.md §7).
    pub fn is_process_fatal(&self) -> bool {
        matches!(self, CoreError::InvariantViolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_violation_is_process_fatal() {
        let e = CoreError::InvariantViolation("double add_value".into());
        assert!(e.is_process_fatal());
    }

    #[test]
    fn unknown_guid_is_batch_fatal_only() {
        let e = CoreError::UnknownGuid(Guid::from_raw(5));
        assert!(!e.is_process_fatal());
    }

    #[test]
    fn display_includes_payload() {
        let e = CoreError::UnknownDtype(42);
        assert!(e.to_string().contains("42"));
    }
}
