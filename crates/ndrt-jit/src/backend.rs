//! The pluggable compiler backend seam (spec.md §1: "individual operation
//! front-ends... out of scope", §4.4: compiler context, dialect registry,
//! pass pipeline).
//!
//! `JitBackend` is what a real toolchain would implement: open a module,
//! compile it under a pipeline, invoke the packed entry point. Production
//! code is generic over it; `NullBackend` is the in-process test double
//! that lets the rest of this workspace exercise caching, ABI plumbing,
//! and delivery without linking a real compiler.

use crate::error::JitError;
use ndrt_depmgr::{IrType, IrValue, ModuleBuilder};

/// Everything a backend needs to produce from one open-module session:
/// a deterministic textual form (for cache-keying) and an opaque
/// compiled artifact `Engine` it alone knows how to invoke.
pub trait JitBackend: Send + Sync {
    type Builder: ModuleBuilder;
    type Engine: Send + Sync;

    /// Begin a fresh module with one function, no arguments or results
    /// declared yet (spec.md §4.2 step 1).
    fn open_module(&self) -> Self::Builder;

    /// Render the in-progress module to the textual form the cache keys
    /// on. Called after `emit_return`.
    fn module_text(&self, builder: &Self::Builder) -> String;

    /// Run the bound pass manager and build an execution engine.
    /// Failure here is `PassFailure` or `CompileFailure` (spec.md §4.4).
    fn build_engine(&self, builder: Self::Builder, pipeline: &str) -> Result<Self::Engine, JitError>;

    /// Invoke the packed entry point. `inputs` is the flat pointer list
    /// from `store_inputs`; `output_words` is the caller-allocated output
    /// buffer size (`2 * total_output_words`, spec.md §4.4). Returns the
    /// buffer actually written.
    fn invoke(&self, engine: &Self::Engine, inputs: &[usize], output_words: usize) -> Result<Vec<usize>, JitError>;
}

/// A function body under construction by `NullBackend`. Records argument
/// and result types only — there is no real IR, no SSA graph, nothing
/// to lower. `set_compute` lets a test supply the packed-ABI behavior a
/// real compiled function would have, since that behavior is produced by
/// operation front-ends, which this workspace treats as an opaque,
/// out-of-scope collaborator.
pub struct NullBuilder {
    arg_types: Vec<IrType>,
    result_types: Vec<(IrType, IrValue)>,
    returned: bool,
    compute: Option<Box<dyn Fn(&[usize], usize) -> Vec<usize> + Send + Sync>>,
}

impl Default for NullBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NullBuilder {
    pub fn new() -> Self {
        Self {
            arg_types: Vec::new(),
            result_types: Vec::new(),
            returned: false,
            compute: None,
        }
    }

    /// Install the function body's simulated behavior: given the flat
    /// input words and the output word count, produce the flat output
    /// buffer. Defaults to zero-filling the output if never set.
    pub fn set_compute(&mut self, f: impl Fn(&[usize], usize) -> Vec<usize> + Send + Sync + 'static) {
        self.compute = Some(Box::new(f));
    }

    pub fn has_returned(&self) -> bool {
        self.returned
    }
}

impl ModuleBuilder for NullBuilder {
    fn add_argument(&mut self, ty: IrType) -> IrValue {
        let value = IrValue(self.arg_types.len());
        self.arg_types.push(ty);
        value
    }

    fn add_result(&mut self, ty: IrType, value: IrValue) {
        self.result_types.push((ty, value));
    }

    fn emit_return(&mut self) {
        self.returned = true;
    }
}

/// A "compiled" function: just the recorded types plus the simulated
/// compute closure, wrapped so `invoke` can run it.
pub struct NullEngine {
    arg_count: usize,
    result_count: usize,
    compute: Box<dyn Fn(&[usize], usize) -> Vec<usize> + Send + Sync>,
}

impl std::fmt::Debug for NullEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NullEngine")
            .field("arg_count", &self.arg_count)
            .field("result_count", &self.result_count)
            .finish()
    }
}

/// Test/no-compiler backend. Exercises the `JitBackend` seam end to end
/// without a real dialect registry or pass manager: `build_engine` never
/// fails, `module_text` is the recorded types rendered deterministically.
#[derive(Debug, Default)]
pub struct NullBackend;

impl NullBackend {
    pub fn new() -> Self {
        Self
    }
}

fn render_type(ty: &IrType) -> String {
    match ty {
        IrType::Local { elem, rank } => format!("local<{elem:?}x{rank}>"),
        IrType::Distributed { elem, rank, env } => format!("dist<{elem:?}x{rank},{:?}>", env.team),
        IrType::DistributedScalar { elem, env } => format!("distscalar<{elem:?},{:?}>", env.team),
    }
}

impl JitBackend for NullBackend {
    type Builder = NullBuilder;
    type Engine = NullEngine;

    fn open_module(&self) -> Self::Builder {
        NullBuilder::new()
    }

    fn module_text(&self, builder: &Self::Builder) -> String {
        let args: Vec<String> = builder.arg_types.iter().map(render_type).collect();
        let results: Vec<String> = builder.result_types.iter().map(|(ty, _)| render_type(ty)).collect();
        format!("func @jit_main({}) -> ({})", args.join(","), results.join(","))
    }

    fn build_engine(&self, builder: Self::Builder, _pipeline: &str) -> Result<Self::Engine, JitError> {
        if !builder.returned {
            return Err(JitError::CompileFailure(
                "module has no terminating return".to_string(),
            ));
        }
        let compute = builder
            .compute
            .unwrap_or_else(|| Box::new(|_inputs: &[usize], words: usize| vec![0usize; words]));
        Ok(NullEngine {
            arg_count: builder.arg_types.len(),
            result_count: builder.result_types.len(),
            compute,
        })
    }

    fn invoke(&self, engine: &Self::Engine, inputs: &[usize], output_words: usize) -> Result<Vec<usize>, JitError> {
        let _ = engine.result_count;
        let _ = engine.arg_count;
        Ok((engine.compute)(inputs, output_words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndrt_depmgr::ElementType;

    #[test]
    fn module_text_reflects_argument_and_result_count() {
        let backend = NullBackend::new();
        let mut builder = backend.open_module();
        let v = builder.add_argument(IrType::Local {
            elem: ElementType::Integer { width: 64 },
            rank: 1,
        });
        builder.add_result(
            IrType::Local {
                elem: ElementType::Integer { width: 64 },
                rank: 1,
            },
            v,
        );
        builder.emit_return();
        let text = backend.module_text(&builder);
        assert!(text.contains("local<"));
        assert_eq!(text.matches("local<").count(), 2);
    }

    #[test]
    fn build_engine_without_return_is_compile_failure() {
        let backend = NullBackend::new();
        let builder = backend.open_module();
        let err = backend.build_engine(builder, "cpu").unwrap_err();
        assert!(matches!(err, JitError::CompileFailure(_)));
    }

    #[test]
    fn invoke_runs_installed_compute_closure() {
        let backend = NullBackend::new();
        let mut builder = backend.open_module();
        builder.set_compute(|inputs, words| {
            let mut out = vec![0usize; words];
            out[..inputs.len().min(words)].copy_from_slice(&inputs[..inputs.len().min(words)]);
            out
        });
        builder.emit_return();
        let engine = backend.build_engine(builder, "cpu").unwrap();
        let result = backend.invoke(&engine, &[1, 2, 3], 5).unwrap();
        assert_eq!(result, vec![1, 2, 3, 0, 0]);
    }
}
