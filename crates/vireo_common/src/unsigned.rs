//! Width-checked unsigned integers with an explicit resize and a canonical
//! [`LogicVec`] view.
//!
//! Arithmetic in the hardware model is always modulo `2^W` for a statically
//! known width `W`. [`Unsigned`] keeps that width explicit: construction
//! checks that the value fits, and widening or narrowing only happens
//! through [`resize`](Unsigned::resize).

use crate::logic::Logic;
use crate::logic_vec::LogicVec;
use crate::result::ValueError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An unsigned integer of fixed bit width `W`.
///
/// The backing store is a [`LogicVec`] whose elements are all definite
/// (`Zero`/`One`); that invariant is enforced by every constructor.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unsigned {
    bits: LogicVec,
}

impl Unsigned {
    /// Creates an `Unsigned` of the given width from a `u64` value.
    ///
    /// Fails with [`ValueError::OutOfRange`] if `value` does not fit in
    /// `width` bits.
    pub fn from_u64(value: u64, width: u32) -> Result<Self, ValueError> {
        if width < 64 && value >= (1u64 << width) {
            return Err(ValueError::OutOfRange { value, width });
        }
        Ok(Self {
            bits: LogicVec::from_u64(value, width),
        })
    }

    /// Reinterprets a [`LogicVec`] as an unsigned integer.
    ///
    /// Returns `None` if any element is not a definite `Zero`/`One` —
    /// the reinterpretation is only defined for fully driven vectors.
    pub fn try_from_logic_vec(lv: &LogicVec) -> Option<Self> {
        if lv.is_definite() {
            Some(Self { bits: lv.clone() })
        } else {
            None
        }
    }

    /// Returns the bit width.
    pub fn width(&self) -> u32 {
        self.bits.width()
    }

    /// Returns the canonical logic-vector view.
    pub fn to_logic_vec(&self) -> LogicVec {
        self.bits.clone()
    }

    /// Returns the value as a `u64`, or `None` if the width exceeds 64 bits.
    pub fn value(&self) -> Option<u64> {
        self.bits.to_u64()
    }

    /// Resizes to `new_width`, truncating high bits or zero-extending.
    pub fn resize(&self, new_width: u32) -> Unsigned {
        let mut bits = LogicVec::new(new_width);
        for i in 0..new_width.min(self.width()) {
            bits.set(i, self.bits.get(i));
        }
        Unsigned { bits }
    }

    /// Increments by one, wrapping modulo `2^W`. Works for any width.
    pub fn wrapping_add_one(&self) -> Unsigned {
        let mut bits = self.bits.clone();
        for i in 0..bits.width() {
            if bits.get(i) == Logic::Zero {
                bits.set(i, Logic::One);
                return Unsigned { bits };
            }
            bits.set(i, Logic::Zero);
        }
        // All ones wraps to zero.
        Unsigned { bits }
    }
}

impl fmt::Display for Unsigned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits)
    }
}

impl fmt::Debug for Unsigned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsigned({})", self.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u64_fits() {
        let u = Unsigned::from_u64(10, 4).unwrap();
        assert_eq!(u.width(), 4);
        assert_eq!(u.value(), Some(10));
    }

    #[test]
    fn from_u64_out_of_range() {
        let err = Unsigned::from_u64(16, 4).unwrap_err();
        assert!(matches!(err, ValueError::OutOfRange { value: 16, width: 4 }));
    }

    #[test]
    fn from_u64_boundary() {
        assert!(Unsigned::from_u64(15, 4).is_ok());
        assert!(Unsigned::from_u64(0, 0).is_ok());
        assert!(Unsigned::from_u64(u64::MAX, 64).is_ok());
    }

    #[test]
    fn try_from_logic_vec_definite() {
        let lv = LogicVec::from_u64(0b101, 3);
        let u = Unsigned::try_from_logic_vec(&lv).unwrap();
        assert_eq!(u.value(), Some(5));
    }

    #[test]
    fn try_from_logic_vec_rejects_unknown() {
        let lv = LogicVec::from_binary_str("1X0").unwrap();
        assert!(Unsigned::try_from_logic_vec(&lv).is_none());
    }

    #[test]
    fn resize_zero_extends() {
        let u = Unsigned::from_u64(5, 3).unwrap().resize(8);
        assert_eq!(u.width(), 8);
        assert_eq!(u.value(), Some(5));
    }

    #[test]
    fn resize_truncates() {
        let u = Unsigned::from_u64(0b1101, 4).unwrap().resize(2);
        assert_eq!(u.width(), 2);
        assert_eq!(u.value(), Some(0b01));
    }

    #[test]
    fn wrapping_add_one() {
        let u = Unsigned::from_u64(5, 4).unwrap();
        assert_eq!(u.wrapping_add_one().value(), Some(6));
    }

    #[test]
    fn wrapping_add_one_carries() {
        let u = Unsigned::from_u64(0b0111, 4).unwrap();
        assert_eq!(u.wrapping_add_one().value(), Some(0b1000));
    }

    #[test]
    fn wrapping_add_one_wraps() {
        let u = Unsigned::from_u64(15, 4).unwrap();
        assert_eq!(u.wrapping_add_one().value(), Some(0));
    }

    #[test]
    fn logic_vec_view() {
        let u = Unsigned::from_u64(0b1010, 4).unwrap();
        assert_eq!(format!("{}", u.to_logic_vec()), "1010");
    }

    #[test]
    fn serde_roundtrip() {
        let u = Unsigned::from_u64(42, 8).unwrap();
        let json = serde_json::to_string(&u).unwrap();
        let back: Unsigned = serde_json::from_str(&json).unwrap();
        assert_eq!(u, back);
    }
}
