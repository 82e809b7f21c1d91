//! Per-compilation dependency bookkeeping: resolving unbound array handles
//! into function arguments, tracking produced values through to delivery,
//! and the memref wire format that connects the two.

mod ir;
mod manager;
mod memref;
mod type_synthesis;

pub use ir::{ElementType, EnvAttr, IrType, IrValue, ModuleBuilder};
pub use manager::{DeliveredArray, DependencyManager, DeliveryCallback, ReadyCallback};
pub use memref::{decode_memref, decode_result, encode_memref, memref_words, ptensor_words, DecodedResult, Memref};
pub use type_synthesis::{element_type_for, synthesize_type};
