//! Type synthesis for unbound inputs (spec.md §4.3).

use crate::ir::{ElementType, EnvAttr, IrType};
use ndrt_types::{ArrayDescriptor, DType};

/// Map a `DType` to its signless compiler-IR element type. Unsigned
/// widths lower to the same signless integer as their signed counterpart
/// (spec.md §4.3, §8 property 6); the element type carries no signedness
/// at all.
pub fn element_type_for(dtype: DType) -> ElementType {
    if dtype.is_float() {
        ElementType::Float {
            width: dtype.bit_width(),
        }
    } else {
        ElementType::Integer {
            width: dtype.bit_width(),
        }
    }
}

/// Synthesize the `IrType` for a future's descriptor, per spec.md §4.3:
///
/// - `team != 0 && rank > 0` → distributed array type.
/// - `team != 0 && rank == 0` → 0-rank distributed scalar.
/// - `team == 0` → local-only array typed by the owned shape (any rank).
pub fn synthesize_type(desc: &ArrayDescriptor) -> IrType {
    let elem = element_type_for(desc.dtype);

    if desc.team.is_distributed() {
        let env = EnvAttr {
            team: desc.team,
            gpu_device: if desc.device.is_empty() {
                None
            } else {
                Some(desc.device.clone())
            },
        };
        if desc.rank > 0 {
            IrType::Distributed {
                elem,
                rank: desc.rank,
                env,
            }
        } else {
            IrType::DistributedScalar { elem, env }
        }
    } else {
        IrType::Local {
            elem,
            rank: desc.rank,
        }
    }
}
