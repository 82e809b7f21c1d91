//! The closed set of array element types.
//!
//! This is deliberately a flat, exhaustive enum rather than any form of
//! runtime reflection (design note in spec.md §9: "do not reach for ad-hoc
//! runtime reflection; a single emit-time table keyed by dtype is
//! sufficient"). The table that maps a `DType` to primitive IR element
//! width/signedness lives here; mapping a `DType` to an actual compiler IR
//! type is the JIT engine's job (type synthesis, spec.md §4.3).

use serde::{Deserialize, Serialize};

/// One of the eleven supported array element types (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DType {
    Bool = 0,
    Int8 = 1,
    Uint8 = 2,
    Int16 = 3,
    Uint16 = 4,
    Int32 = 5,
    Uint32 = 6,
    Int64 = 7,
    Uint64 = 8,
    Float32 = 9,
    Float64 = 10,
}

impl DType {
    /// Bit width of the underlying IR integer/float type.
    pub const fn bit_width(self) -> u32 {
        match self {
            DType::Bool => 1,
            DType::Int8 | DType::Uint8 => 8,
            DType::Int16 | DType::Uint16 => 16,
            DType::Int32 | DType::Uint32 | DType::Float32 => 32,
            DType::Int64 | DType::Uint64 | DType::Float64 => 64,
        }
    }

    /// True for the two IEEE float variants.
    pub const fn is_float(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// True for the unsigned integer variants. Unsigned width is lowered to
    /// a signless IR integer of matching width; this flag is preserved
    /// only out-of-band in the dtype tag itself, never in the emitted IR
    /// type (spec.md §4.3, §8 property 6).
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            DType::Uint8 | DType::Uint16 | DType::Uint32 | DType::Uint64
        )
    }

    /// Decode from the raw tag used at the ABI boundary (e.g.
    /// deserialized deferred-node descriptors). Out-of-range tags are the
    /// `UnknownDtype` fatal error (spec.md §7).
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => DType::Bool,
            1 => DType::Int8,
            2 => DType::Uint8,
            3 => DType::Int16,
            4 => DType::Uint16,
            5 => DType::Int32,
            6 => DType::Uint32,
            7 => DType::Int64,
            8 => DType::Uint64,
            9 => DType::Float32,
            10 => DType::Float64,
            _ => return None,
        })
    }

    /// The raw tag, inverse of `from_tag`.
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

/// Decode a raw dtype tag, raising `UnknownDtype` for anything outside
/// the eleven valid tags (spec.md §7). The single place in this
/// workspace that would call this is a wire/ABI boundary decoding a
/// deferred-node descriptor from outside the process; this workspace
/// never builds one (no Python bindings or wire layer, spec.md
/// Non-goals), so `decode_tag` has no production caller yet — it exists
/// so that boundary, when built, has exactly one place to call.
pub fn decode_tag(tag: u8) -> Result<DType, crate::error::CoreError> {
    DType::from_tag(tag).ok_or(crate::error::CoreError::UnknownDtype(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_tag() {
        for tag in 0u8..=10 {
            let d = DType::from_tag(tag).expect("valid tag");
            assert_eq!(d.tag(), tag);
        }
    }

    #[test]
    fn out_of_range_tag_is_none() {
        assert!(DType::from_tag(11).is_none());
        assert!(DType::from_tag(255).is_none());
    }

    #[test]
    fn unsigned_widths_match_signed_counterparts() {
        assert_eq!(DType::Uint8.bit_width(), DType::Int8.bit_width());
        assert_eq!(DType::Uint16.bit_width(), DType::Int16.bit_width());
        assert_eq!(DType::Uint32.bit_width(), DType::Int32.bit_width());
        assert_eq!(DType::Uint64.bit_width(), DType::Int64.bit_width());
    }

    #[test]
    fn signedness_classification() {
        assert!(DType::Uint32.is_unsigned());
        assert!(!DType::Int32.is_unsigned());
        assert!(!DType::Float32.is_unsigned());
    }

    #[test]
    fn float_classification() {
        assert!(DType::Float32.is_float());
        assert!(DType::Float64.is_float());
        assert!(!DType::Int64.is_float());
    }

    proptest::proptest! {
        /// Every `u8` either round-trips through `decode_tag`/`tag` to
        /// itself, or is outside the eleven valid tags and always raises
        /// `UnknownDtype` carrying the exact tag that was rejected.
        #[test]
        fn decode_tag_round_trips_or_reports_the_rejected_tag(tag in 0u8..=255) {
            match decode_tag(tag) {
                Ok(d) => proptest::prop_assert_eq!(d.tag(), tag),
                Err(crate::error::CoreError::UnknownDtype(rejected)) => proptest::prop_assert_eq!(rejected, tag),
                Err(other) => return Err(proptest::test_runner::TestCaseError::fail(format!("unexpected error: {other}"))),
            }
        }
    }
}
