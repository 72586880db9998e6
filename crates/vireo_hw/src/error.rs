//! Error types for the hardware model.
//!
//! All errors raised during component construction, port binding, and
//! simulation are variants of [`HwError`]. These indicate programming
//! errors or configuration mistakes and are surfaced to the caller
//! immediately — nothing inside the hardware model catches them.

use vireo_common::ValueError;

/// Errors that can occur while building or simulating the hardware model.
#[derive(Debug, thiserror::Error)]
pub enum HwError {
    /// A numeric argument is outside its declared domain.
    #[error("{what} is {value}, must be at least {min}")]
    OutOfRange {
        /// Which argument violated its domain.
        what: &'static str,
        /// The offending value.
        value: u64,
        /// The smallest permitted value.
        min: u64,
    },

    /// A width or lifecycle precondition was violated during
    /// `pre_initialize`. Fatal to simulation start-up.
    #[error("invalid configuration of {component}: {reason}")]
    InvalidConfiguration {
        /// The identity of the offending component.
        component: String,
        /// What precondition was violated.
        reason: String,
    },

    /// A signal was driven with a value of the wrong width.
    #[error("signal {signal} has width {expected}, driven with width {actual}")]
    WidthMismatch {
        /// The signal name.
        signal: String,
        /// The signal's declared width.
        expected: u32,
        /// The width of the driven value.
        actual: u32,
    },

    /// A signal was driven twice within the same delta cycle.
    #[error("signal {signal} driven twice in one delta cycle")]
    MultipleDrivers {
        /// The signal name.
        signal: String,
    },

    /// Too many delta cycles in one settle step, indicating a
    /// combinational loop.
    #[error("delta cycle limit exceeded at cycle {cycle} (max {max_deltas} deltas)")]
    DeltaCycleLimit {
        /// The clock cycle where the limit was hit.
        cycle: u64,
        /// The maximum number of delta cycles allowed.
        max_deltas: u32,
    },

    /// A transaction-site operation was invoked before `establish`.
    #[error("transaction site of {component} used before establish")]
    NotEstablished {
        /// The identity of the offending component.
        component: String,
    },

    /// A value-level error (width overflow) bubbled up from the
    /// vector primitives.
    #[error(transparent)]
    Value(#[from] ValueError),
}
