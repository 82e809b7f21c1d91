//! Shared vocabulary for the ndrt deferred-execution runtime: the closed
//! dtype table, process-unique guids, team ids, the core error taxonomy,
//! and environment-variable configuration for the JIT engine.
//!
//! Kept deliberately small and dependency-light (`thiserror` + `serde`
//! only) since every other crate in the workspace depends on it.

mod config;
mod dtype;
mod error;
mod future;
mod guid;
mod team;

pub use config::{ConfigError, JitConfig, OptLevel, VerboseLevel};
pub use dtype::{decode_tag, DType};
pub use error::CoreError;
pub use future::{ArrayDescriptor, ArrayFuture};
pub use guid::{Guid, GuidAllocator, NOGUID};
pub use team::TeamId;
