//! Error types for the XIL mapping layer.
//!
//! Programming errors are surfaced to the caller immediately and never
//! caught inside the core. A mapper that simply does not handle an
//! instruction is *not* an error: it declines by yielding an empty mapping
//! sequence (or `None` from `try_allocate`), and callers try other mappers.

use crate::instr::XilOpcode;
use vireo_hw::HwError;

/// Errors raised by the mapping layer.
#[derive(Debug, thiserror::Error)]
pub enum XilError {
    /// An index argument is outside its declared domain.
    #[error("{what} {index} out of range (count {count})")]
    OutOfRange {
        /// Which argument violated its domain.
        what: &'static str,
        /// The offending index.
        index: usize,
        /// The number of valid entries.
        count: usize,
    },

    /// An instruction matched a mapper's coarse opcode family check but no
    /// specific arm. Indicates a programming error in the mapper or an
    /// ill-formed instruction.
    #[error("no mapping arm implemented for {opcode}")]
    NotImplemented {
        /// The opcode that fell through.
        opcode: XilOpcode,
    },

    /// A hardware-model error bubbled up while realizing a mapping.
    #[error(transparent)]
    Hw(#[from] HwError),
}
