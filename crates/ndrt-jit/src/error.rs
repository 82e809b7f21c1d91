//! JIT engine error taxonomy (spec.md §7).

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JitError {
    /// The bound pass manager reported failure while running `stage`.
    #[error("pass pipeline failed at stage `{stage}`")]
    PassFailure { stage: String },

    /// Execution engine construction failed for a module that otherwise
    /// passed the pipeline.
    #[error("compilation failed: {0}")]
    CompileFailure(String),

    /// The packed entry symbol for a compiled module could not be found.
    #[error("entry point not found: {0}")]
    LookupFailure(String),

    /// `DDPT_OPT_LEVEL` or another config value was out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl JitError {
    /// All `JitError` variants are fatal for the batch (spec.md §7): the
    /// core never retries a failed compile or invoke.
    pub fn is_fatal(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_is_fatal() {
        let errs = [
            JitError::PassFailure { stage: "s".into() },
            JitError::CompileFailure("x".into()),
            JitError::LookupFailure("f".into()),
            JitError::InvalidConfig("c".into()),
        ];
        assert!(errs.iter().all(JitError::is_fatal));
    }
}
