//! Shared-library resolution for the compiled code's runtime symbols
//! (spec.md §4.4, "Shared libraries"). Resolves paths only — this
//! workspace never dlopen's anything, since the backend that would
//! actually link against these libraries is out of scope (spec.md §1).

use ndrt_types::JitConfig;
use std::path::PathBuf;

/// Compiled-in fallback names for the two host runtime libraries that
/// are always loaded, regardless of CPU/GPU mode.
const HOST_CRUNNER_FALLBACK: &str = "libmlir_c_runner_utils.so";
const HOST_RUNNER_FALLBACK: &str = "libmlir_runner_utils.so";

/// The ordered set of shared libraries a compiled function needs
/// resolved before invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedLibraries {
    pub host_c_runner: PathBuf,
    pub host_runner: PathBuf,
    pub distributed_runtime: PathBuf,
    /// Only present in GPU mode (spec.md §4.4).
    pub gpu_runtime: Option<PathBuf>,
}

fn under_mlir_root(config: &JitConfig, leaf: &str) -> PathBuf {
    match &config.mlir_root {
        Some(root) => root.join("lib").join(leaf),
        None => PathBuf::from(leaf),
    }
}

impl SharedLibraries {
    /// Resolve from `config`: host utilities fall back under `MLIRROOT`
    /// if set, else the bare compiled-in name; the distributed runtime
    /// and (in GPU mode) device runtime come straight from `JitConfig`.
    pub fn resolve(config: &JitConfig) -> Self {
        Self {
            host_c_runner: under_mlir_root(config, HOST_CRUNNER_FALLBACK),
            host_runner: under_mlir_root(config, HOST_RUNNER_FALLBACK),
            distributed_runtime: config.idtr_so.clone(),
            gpu_runtime: config.use_gpu.then(|| config.gpux_so.clone()),
        }
    }

    /// All libraries that must be loaded for this configuration, in load
    /// order.
    pub fn all(&self) -> Vec<PathBuf> {
        let mut libs = vec![
            self.host_c_runner.clone(),
            self.host_runner.clone(),
            self.distributed_runtime.clone(),
        ];
        if let Some(gpu) = &self.gpu_runtime {
            libs.push(gpu.clone());
        }
        libs
    }
}
