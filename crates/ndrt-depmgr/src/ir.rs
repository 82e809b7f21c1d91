//! A minimal stand-in for the compiler IR types and builder the real
//! engine would use. The dependency manager only needs to (a) know which
//! `IrType` an array maps to and (b) be able to append arguments/results
//! to an in-progress function body; the real compiler framework (dialect
//! registry, SSA values, attributes) is exactly the opaque collaborator
//! spec.md §1 places out of scope. `ModuleBuilder` is the seam a real
//! backend plugs into.

use ndrt_types::TeamId;

/// Signless element type: integer width or float width. Per spec.md §4.3
/// and §8 property 6, unsigned dtypes lower to the *same* signless
/// integer type as their signed counterpart — there is no
/// `Integer { signed: bool }` variant here on purpose, so that invariant
/// can't even be expressed, let alone violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Integer { width: u32 },
    Float { width: u32 },
}

/// The `{distributed(T), gpu(V) if V != ""}` environment attribute set
/// from spec.md §4.3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvAttr {
    pub team: TeamId,
    pub gpu_device: Option<String>,
}

/// The compiler-IR type synthesized for one array handle (spec.md §4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrType {
    /// `team == 0`: local-only array (or 0-rank scalar when `rank == 0`).
    Local { elem: ElementType, rank: u32 },
    /// `team != 0 && rank > 0`: distributed array.
    Distributed {
        elem: ElementType,
        rank: u32,
        env: EnvAttr,
    },
    /// `team != 0 && rank == 0`: 0-rank distributed scalar.
    DistributedScalar { elem: ElementType, env: EnvAttr },
}

impl IrType {
    pub fn rank(&self) -> u32 {
        match self {
            IrType::Local { rank, .. } => *rank,
            IrType::Distributed { rank, .. } => *rank,
            IrType::DistributedScalar { .. } => 0,
        }
    }

    pub fn is_distributed(&self) -> bool {
        matches!(self, IrType::Distributed { .. } | IrType::DistributedScalar { .. })
    }
}

/// Opaque SSA-value handle inside a function body under construction.
/// Never dereferenced by the dependency manager; only threaded between
/// `ModuleBuilder` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IrValue(pub usize);

/// The seam between the dependency manager and a real compiler backend.
/// Production code is written against this trait; tests substitute
/// `ndrt_jit`'s `NullBackend`-backed builder so the suite never needs a
/// real MLIR toolchain.
pub trait ModuleBuilder {
    /// Append a new function argument of type `ty` and return its SSA
    /// value. Spec.md §4.3: "insert the argument at position
    /// `args.size() - 1` in the function signature" — i.e. arguments are
    /// always appended in resolution order.
    fn add_argument(&mut self, ty: IrType) -> IrValue;

    /// Extend the function's declared result types with `ty`, bound to
    /// `value`, at the next result index.
    fn add_result(&mut self, ty: IrType, value: IrValue);

    /// Emit the function's terminating return operation once every result
    /// has been registered via `add_result`.
    fn emit_return(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_rank_zero_is_scalar_like() {
        let t = IrType::Local {
            elem: ElementType::Integer { width: 64 },
            rank: 0,
        };
        assert_eq!(t.rank(), 0);
        assert!(!t.is_distributed());
    }

    #[test]
    fn distributed_scalar_rank_is_zero() {
        let t = IrType::DistributedScalar {
            elem: ElementType::Float { width: 32 },
            env: EnvAttr {
                team: TeamId::from_raw(1),
                gpu_device: None,
            },
        };
        assert_eq!(t.rank(), 0);
        assert!(t.is_distributed());
    }
}
