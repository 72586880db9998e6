//! Type descriptors and wire-width lowering.
//!
//! The instruction selector describes operand and result types with
//! [`TypeDesc`]; a [`TypeLowering`] turns each descriptor into the width
//! of the wire that carries a value of that type.

use serde::{Deserialize, Serialize};

/// A language-independent description of an operand or result type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TypeDesc {
    /// A single logic bit.
    Bit,
    /// An unsigned integer of the given bit width.
    Unsigned {
        /// The number of bits.
        width: u32,
    },
    /// A signed (two's complement) integer of the given bit width.
    Signed {
        /// The number of bits.
        width: u32,
    },
}

/// Computes the wire width, in bits, of a value of a given type.
pub trait TypeLowering {
    /// Returns the non-negative wire width for `ty`.
    fn wire_width(&self, ty: &TypeDesc) -> u32;
}

/// The standard lowering: a bit is one wire, integer types take their
/// declared width.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultLowering;

impl TypeLowering for DefaultLowering {
    fn wire_width(&self, ty: &TypeDesc) -> u32 {
        match ty {
            TypeDesc::Bit => 1,
            TypeDesc::Unsigned { width } | TypeDesc::Signed { width } => *width,
        }
    }
}
