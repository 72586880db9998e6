//! Common error types for value-level operations.

/// Errors raised by width-checked value constructors.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// A numeric value does not fit in its declared bit width.
    #[error("value {value} does not fit in {width} bits")]
    OutOfRange {
        /// The offending value.
        value: u64,
        /// The declared width in bits.
        width: u32,
    },
}
