//! Pass-pipeline assembly, content-addressed compilation caching, and
//! packed invocation across the pluggable compiler-backend seam.

mod backend;
mod cache;
mod engine;
mod error;
mod pipeline;
mod shared_libs;

pub use backend::{JitBackend, NullBackend, NullBuilder, NullEngine};
pub use cache::{EngineCache, ModuleHash};
pub use engine::JitEngine;
pub use error::JitError;
pub use pipeline::pipeline_for;
pub use shared_libs::SharedLibraries;
