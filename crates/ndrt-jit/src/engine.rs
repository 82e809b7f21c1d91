//! The process-wide JIT engine: pipeline + cache + backend, wired
//! together into the per-batch state machine from spec.md §4.4:
//! `OpenModule -> Emit* -> Finalise -> Compile -> (Cached? -> Reuse :
//! Build) -> Invoke -> Deliver -> Dispose`.
//!
//! `Emit*`, `Finalise`, and `Deliver` are the dependency manager's job
//! (`ndrt_depmgr::DependencyManager`); this type owns `Compile`,
//! `(Cached?)`, and `Invoke`.

use crate::backend::JitBackend;
use crate::cache::{EngineCache, ModuleHash};
use crate::error::JitError;
use crate::pipeline::pipeline_for;
use crate::shared_libs::SharedLibraries;
use ndrt_types::JitConfig;
use std::sync::Arc;
use tracing::{debug, trace};

/// Process-wide JIT state (spec.md §3, "JIT engine state"): one pipeline
/// string fixed at construction, one cache for the process lifetime,
/// resolved shared-library paths, and the backend that does the actual
/// work.
pub struct JitEngine<B: JitBackend> {
    backend: B,
    config: JitConfig,
    pipeline: String,
    shared_libs: SharedLibraries,
    cache: EngineCache<B::Engine>,
}

impl<B: JitBackend> JitEngine<B> {
    pub fn new(backend: B, config: JitConfig) -> Self {
        let pipeline = pipeline_for(&config);
        if config.verbose.echoes_pipeline() {
            debug!(pipeline = %pipeline, "jit: assembled pass pipeline");
        }
        let shared_libs = SharedLibraries::resolve(&config);
        Self {
            backend,
            config,
            pipeline,
            shared_libs,
            cache: EngineCache::new(),
        }
    }

    pub fn config(&self) -> &JitConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &str {
        &self.pipeline
    }

    pub fn shared_libs(&self) -> &SharedLibraries {
        &self.shared_libs
    }

    /// `(hits, misses)` against the engine cache, for tests that verify
    /// the cache-hit scenario (spec.md §8 property 3, seed scenario S4).
    pub fn cache_hit_counts(&self) -> (u64, u64) {
        self.cache.hit_counts()
    }

    /// `OpenModule`.
    pub fn open_module(&self) -> B::Builder {
        self.backend.open_module()
    }

    /// `Compile -> (Cached? -> Reuse : Build)`. Takes a finished,
    /// return-terminated module and produces a ready-to-invoke engine,
    /// reusing a cached one if the module's textual form has been seen
    /// before and caching is enabled.
    pub fn compile(&self, builder: B::Builder) -> Result<Arc<B::Engine>, JitError> {
        let text = self.backend.module_text(&builder);
        let key = ModuleHash::compute(&text);

        if self.config.use_cache {
            if let Some(engine) = self.cache.get(&key) {
                trace!(key = key.as_str(), "jit: cache hit");
                return Ok(engine);
            }
        }

        if self.config.verbose.dumps_pre_lowering() {
            debug!(module = %text, "jit: pre-lowering module text");
        }

        let engine = Arc::new(self.backend.build_engine(builder, &self.pipeline)?);

        if self.config.use_cache {
            self.cache.insert(key, engine.clone());
        }
        Ok(engine)
    }

    /// `Invoke`.
    pub fn invoke(&self, engine: &B::Engine, inputs: &[usize], output_words: usize) -> Result<Vec<usize>, JitError> {
        self.backend.invoke(engine, inputs, output_words)
    }
}
