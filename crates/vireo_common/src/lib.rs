//! Shared foundational types used across the Vireo HLS mid-end.
//!
//! This crate provides the value-level vocabulary of the hardware model:
//! 9-state logic values, packed fixed-width logic vectors, and width-checked
//! unsigned integers with explicit resize.

#![warn(missing_docs)]

pub mod logic;
pub mod logic_vec;
pub mod result;
pub mod unsigned;

pub use logic::Logic;
pub use logic_vec::LogicVec;
pub use result::ValueError;
pub use unsigned::Unsigned;
