//! Pass pipeline assembly (spec.md §4.4, "Pipeline selection").
//!
//! Ordering is load-bearing and is not meant to be reshuffled at call
//! sites: distributed passes run before array-to-loop lowering,
//! bufferisation precedes loop-to-control-flow lowering, and GPU mode
//! splices a kernel-outlining/SPIR-V/GPU-runtime-binding block between
//! loop generation and the final lowering to the low-level IR.

use ndrt_types::JitConfig;

const CPU_PIPELINE: &[&str] = &[
    "convert-distributed-to-standard",
    "convert-array-to-loops",
    "one-shot-bufferize",
    "convert-loops-to-cf",
    "convert-cf-to-llvm",
    "convert-func-to-llvm",
    "reconcile-unrealized-casts",
];

const GPU_PIPELINE: &[&str] = &[
    "convert-distributed-to-standard",
    "convert-array-to-loops",
    "one-shot-bufferize",
    "gpu-kernel-outlining",
    "convert-gpu-to-spirv",
    "gpu-runtime-binding",
    "convert-loops-to-cf",
    "convert-cf-to-llvm",
    "convert-func-to-llvm",
    "reconcile-unrealized-casts",
];

/// Join one of the baseline pipelines into the textual pass-manager
/// specification, honoring a full-string override from `config`.
pub fn pipeline_for(config: &JitConfig) -> String {
    if let Some(override_str) = &config.passes_override {
        return override_str.clone();
    }
    let passes = if config.use_gpu { GPU_PIPELINE } else { CPU_PIPELINE };
    passes.join(",")
}
