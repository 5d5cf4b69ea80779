//! 16.16 fixed-point scalar shared by every stage of the span generator.
//!
//! * One map tile is exactly [`FRACUNIT`] wide.
//! * Products and quotients go through `i64` and are rescaled by
//!   [`FRACBITS`]; results that do not fit saturate instead of wrapping.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

pub const FRACBITS: u32 = 16;
pub const FRACUNIT: i32 = 1 << FRACBITS;

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(i32);

#[inline]
fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl Fixed {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(FRACUNIT);
    pub const HALF: Self = Self(FRACUNIT / 2);
    pub const MAX: Self = Self(i32::MAX);
    pub const MIN: Self = Self(i32::MIN);

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn from_int(v: i32) -> Self {
        Self(v << FRACBITS)
    }

    /// Integer part, rounded toward negative infinity.
    #[inline]
    pub const fn floor_int(self) -> i32 {
        self.0 >> FRACBITS
    }

    /// Smallest integer not below `self`.
    #[inline]
    pub const fn ceil_int(self) -> i32 {
        ((self.0 as i64 + FRACUNIT as i64 - 1) >> FRACBITS) as i32
    }

    /// Fractional bits only (always in `0..FRACUNIT`).
    #[inline]
    pub const fn frac(self) -> i32 {
        self.0 & (FRACUNIT - 1)
    }

    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub fn from_f32(v: f32) -> Self {
        Self(saturate((v as f64 * FRACUNIT as f64).round() as i64))
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 / FRACUNIT as f32
    }

    /// `num / den` as a fixed value.
    #[inline]
    pub fn ratio(num: i32, den: i32) -> Self {
        Self::from_int(num) / Self::from_int(den)
    }

    /// Multiply by a plain integer (no rescale).
    #[inline]
    pub fn scale(self, n: i32) -> Self {
        Self(saturate(self.0 as i64 * n as i64))
    }

    /// `self * num / den` with a single rounding step.
    pub fn mul_div(self, num: Self, den: Self) -> Self {
        if den.0 == 0 {
            return if (self.0 >= 0) == (num.0 >= 0) {
                Self::MAX
            } else {
                Self::MIN
            };
        }
        Self(saturate(self.0 as i64 * num.0 as i64 / den.0 as i64))
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        if self <= other { self } else { other }
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        if self >= other { self } else { other }
    }
}

impl Add for Fixed {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Fixed {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Fixed {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Mul for Fixed {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(saturate((self.0 as i64 * rhs.0 as i64) >> FRACBITS))
    }
}

impl Div for Fixed {
    type Output = Self;
    /// Division by zero saturates toward the numerator's sign.
    #[inline]
    fn div(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            return if self.0 >= 0 { Self::MAX } else { Self::MIN };
        }
        Self(saturate(((self.0 as i64) << FRACBITS) / rhs.0 as i64))
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({:.5})", self.to_f32())
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_and_div_rescale() {
        let a = Fixed::from_int(3);
        let b = Fixed::HALF;
        assert_eq!(a * b, Fixed::from_raw(3 * FRACUNIT / 2));
        assert_eq!(a / b, Fixed::from_int(6));
        assert_eq!(Fixed::ratio(1, 4), Fixed::from_raw(FRACUNIT / 4));
    }

    #[test]
    fn negative_values_round_like_shifts() {
        let v = Fixed::from_raw(-1);
        assert_eq!(v.floor_int(), -1);
        assert_eq!(v.ceil_int(), 0);
        assert_eq!(v.frac(), FRACUNIT - 1);
        assert_eq!(Fixed::from_raw(FRACUNIT + 1).ceil_int(), 2);
    }

    #[test]
    fn division_saturates_instead_of_overflowing() {
        assert_eq!(Fixed::from_int(20000) / Fixed::from_raw(1), Fixed::MAX);
        assert_eq!(-Fixed::ONE / Fixed::ZERO, Fixed::MIN);
        assert_eq!(Fixed::ONE / Fixed::ZERO, Fixed::MAX);
    }

    #[test]
    fn mul_div_keeps_precision() {
        let v = Fixed::from_int(10).mul_div(Fixed::from_int(3), Fixed::from_int(4));
        assert_eq!(v, Fixed::from_raw(10 * 3 * FRACUNIT / 4));
    }

    #[test]
    fn float_conversion() {
        assert_eq!(Fixed::from_f32(0.125), Fixed::from_raw(FRACUNIT / 8));
        assert!((Fixed::from_raw(98304).to_f32() - 1.5).abs() < 1e-6);
    }
}
