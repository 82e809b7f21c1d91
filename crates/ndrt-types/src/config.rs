//! Environment-variable configuration for the JIT engine (spec.md §6).
//!
//! Constructed once per process by `JitConfig::from_env()`. Tests build
//! configs from an explicit map instead of mutating the real process
//! environment, since `std::env` is process-global and parallel tests
//! would otherwise race each other.

use std::collections::HashMap;
use std::path::PathBuf;

/// Optimisation level for the execution engine transformer. `0..=3`; any
/// other value read from `DDPT_OPT_LEVEL` is fatal (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OptLevel(u8);

impl OptLevel {
    pub const O0: OptLevel = OptLevel(0);
    pub const O3: OptLevel = OptLevel(3);

    pub fn new(level: u8) -> Option<Self> {
        if level <= 3 {
            Some(OptLevel(level))
        } else {
            None
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for OptLevel {
    fn default() -> Self {
        OptLevel::O3
    }
}

/// How much the engine should dump/time/print during compilation
/// (`DDPT_VERBOSE`, spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct VerboseLevel(u32);

impl VerboseLevel {
    pub const fn new(level: u32) -> Self {
        VerboseLevel(level)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Threshold 1: echo the assembled pipeline string.
    pub const fn echoes_pipeline(self) -> bool {
        self.0 >= 1
    }

    /// Threshold 2: dump the module before lowering.
    pub const fn dumps_pre_lowering(self) -> bool {
        self.0 >= 2
    }

    /// Threshold 3: enable pass timing and dump the module after lowering.
    pub const fn times_passes(self) -> bool {
        self.0 >= 3
    }

    /// Threshold 4: print IR between every pass.
    pub const fn prints_between_passes(self) -> bool {
        self.0 >= 4
    }
}

/// Parsed, validated configuration for the JIT engine. See spec.md §6 for
/// the full variable list.
#[derive(Debug, Clone)]
pub struct JitConfig {
    /// `DDPT_PASSES` — full override of the pass-pipeline string.
    pub passes_override: Option<String>,
    /// `DDPT_USE_GPU` — non-empty selects the gpu pipeline + gpu runtime.
    pub use_gpu: bool,
    /// `DDPT_USE_CACHE` — default on.
    pub use_cache: bool,
    /// `DDPT_OPT_LEVEL` — 0-3, default 3.
    pub opt_level: OptLevel,
    /// `DDPT_VERBOSE` — default 0.
    pub verbose: VerboseLevel,
    /// `DDPT_IDTR_SO` — default `libidtr.so`.
    pub idtr_so: PathBuf,
    /// `DDPT_GPUX_SO` — fallback `<IMEXROOT>/lib/liblevel-zero-runtime.so`.
    pub gpux_so: PathBuf,
    /// `MLIRROOT`.
    pub mlir_root: Option<PathBuf>,
    /// `IMEXROOT`.
    pub imex_root: Option<PathBuf>,
}

/// Error building a `JitConfig` from the environment: only `DDPT_OPT_LEVEL`
/// can fail, and it is fatal per spec.md §6.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid DDPT_OPT_LEVEL: `{0}` (expected 0-3)")]
    InvalidOptLevel(String),
}

fn truthy(value: &str) -> bool {
    matches!(value, "1" | "y" | "Y" | "on" | "ON")
}

impl JitConfig {
    /// Read configuration from the real process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_map(&vars)
    }

    /// Build configuration from an explicit map, the way the rest of this
    /// workspace's tests avoid mutating real process env.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |k: &str| vars.get(k).cloned();

        let opt_level = match get("DDPT_OPT_LEVEL") {
            None => OptLevel::default(),
            Some(raw) => {
                let parsed: u8 = raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidOptLevel(raw.clone()))?;
                OptLevel::new(parsed).ok_or(ConfigError::InvalidOptLevel(raw))?
            }
        };

        let verbose = get("DDPT_VERBOSE")
            .and_then(|raw| raw.parse::<u32>().ok())
            .map(VerboseLevel::new)
            .unwrap_or_default();

        let use_cache = get("DDPT_USE_CACHE")
            .map(|raw| truthy(&raw))
            .unwrap_or(true);

        let use_gpu = get("DDPT_USE_GPU")
            .map(|raw| !raw.is_empty())
            .unwrap_or(false);

        let imex_root = get("IMEXROOT").map(PathBuf::from);
        let mlir_root = get("MLIRROOT").map(PathBuf::from);

        let idtr_so = get("DDPT_IDTR_SO")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("libidtr.so"));

        let gpux_so = get("DDPT_GPUX_SO").map(PathBuf::from).unwrap_or_else(|| {
            imex_root
                .clone()
                .map(|root| root.join("lib/liblevel-zero-runtime.so"))
                .unwrap_or_else(|| PathBuf::from("liblevel-zero-runtime.so"))
        });

        Ok(Self {
            passes_override: get("DDPT_PASSES"),
            use_gpu,
            use_cache,
            opt_level,
            verbose,
            idtr_so,
            gpux_so,
            mlir_root,
            imex_root,
        })
    }
}
