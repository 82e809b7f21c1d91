//! Harness for the JIT engine's cache-key determinism property (spec.md
//! §8, property 3): two builds with identical post-build textual form
//! hash to the same key and share an execution engine; any textual
//! difference yields a distinct engine. A dedicated crate rather than a
//! `#[cfg(test)]` module in `ndrt-jit` so the property can be exercised
//! against the full `ndrt-depmgr` builder seam, not just the cache's own
//! unit tests.

use ndrt_depmgr::{ElementType, IrType, ModuleBuilder};
use ndrt_jit::{JitBackend, JitEngine, NullBackend};
use ndrt_types::JitConfig;
use std::collections::HashMap;
use std::sync::Arc;

/// A trivial module shape: `rank` integer arguments in, one integer
/// result of the same rank out, built and returned through the same
/// `JitEngine` every call so repeated builds are free to hit the cache.
pub fn build_identity_module(engine: &JitEngine<NullBackend>, rank: u32) -> Arc<ndrt_jit::NullEngine> {
    let mut builder = engine.open_module();
    let ty = IrType::Local {
        elem: ElementType::Integer { width: 64 },
        rank,
    };
    let value = builder.add_argument(ty.clone());
    builder.add_result(ty, value);
    builder.emit_return();
    engine.compile(builder).expect("null backend never fails to build")
}

/// Fresh `JitEngine<NullBackend>` with caching enabled, for harness use.
pub fn harness_engine() -> JitEngine<NullBackend> {
    JitEngine::new(NullBackend::new(), JitConfig::from_map(&HashMap::new()).expect("empty config map is valid"))
}
