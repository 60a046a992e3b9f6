//! Exact rational `Q = num/den`, always reduced with `den > 0`.
//!
//! Backed by [`num_rational::BigRational`], which already maintains the
//! `den > 0`, `gcd(|num|, den) = 1` invariant `spec.md` §3.1 requires on
//! every constructor and arithmetic operation, so no separate reduction
//! step is needed here.

use crate::kernel::integer::{RoundingMode, Z};
use num_bigint::BigInt;
use num_integer::Integer as _;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::fmt;

/// Exact rational number in lowest terms with a positive denominator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Q(BigRational);

impl Q {
    pub fn zero() -> Self {
        Q(BigRational::zero())
    }

    pub fn one() -> Self {
        Q(BigRational::one())
    }

    pub fn from_integer(z: Z) -> Self {
        Q(BigRational::from_integer(z.into_bigint()))
    }

    pub fn new(num: Z, den: Z) -> Option<Q> {
        if den.is_zero() {
            return None;
        }
        Some(Q(BigRational::new(num.into_bigint(), den.into_bigint())))
    }

    pub fn numerator(&self) -> Z {
        Z::from_bigint(self.0.numer().clone())
    }

    pub fn denominator(&self) -> Z {
        Z::from_bigint(self.0.denom().clone())
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn sgn(&self) -> i32 {
        if self.0.is_zero() {
            0
        } else if self.0.is_negative() {
            -1
        } else {
            1
        }
    }

    pub fn add(&self, other: &Q) -> Q {
        Q(&self.0 + &other.0)
    }

    pub fn sub(&self, other: &Q) -> Q {
        Q(&self.0 - &other.0)
    }

    pub fn mul(&self, other: &Q) -> Q {
        Q(&self.0 * &other.0)
    }

    /// `self / other`. `None` on division by zero (`E_DIVBYZERO`, or
    /// `E_ZERODIVZERO` when `self` is also zero — the caller distinguishes
    /// the two using [`Q::is_zero`]).
    pub fn div(&self, other: &Q) -> Option<Q> {
        if other.is_zero() {
            None
        } else {
            Some(Q(&self.0 / &other.0))
        }
    }

    pub fn neg(&self) -> Q {
        Q(-&self.0)
    }

    /// Multiplicative inverse; `None` for zero (`E_1OVER0`, aliased to
    /// `E_DIVBYZERO` per `calc_asm::ErrorCode::ONE_OVER_ZERO`).
    pub fn inv(&self) -> Option<Q> {
        if self.is_zero() {
            None
        } else {
            Some(Q(self.0.recip()))
        }
    }

    pub fn abs(&self) -> Q {
        Q(self.0.abs())
    }

    pub fn square(&self) -> Q {
        Q(&self.0 * &self.0)
    }

    /// Integer part, truncating toward zero.
    pub fn int_part(&self) -> Z {
        Z::from_bigint(self.0.trunc().to_integer())
    }

    /// Fractional part: `self - int_part(self)`.
    pub fn frac_part(&self) -> Q {
        Q(self.0.fract())
    }

    /// Integer exponentiation, `self^exp` for `exp >= 0`; negative
    /// exponents invert first.
    pub fn pow(&self, exp: i64) -> Option<Q> {
        if exp >= 0 {
            Some(Q(num_traits::pow::Pow::pow(self.0.clone(), exp as u64 as usize)))
        } else {
            self.inv()
                .map(|inv| Q(num_traits::pow::Pow::pow(inv.0, (-exp) as u64 as usize)))
        }
    }

    /// Scale by a power of two: `self * 2^exp` (negative `exp` divides).
    pub fn scale(&self, exp: i64) -> Q {
        let two = BigRational::from_integer(BigInt::from(2));
        if exp >= 0 {
            Q(&self.0 * num_traits::pow::Pow::pow(two, exp as usize))
        } else {
            Q(&self.0 / num_traits::pow::Pow::pow(two, (-exp) as usize))
        }
    }

    /// Round to an integer using `mode`, honoring `spec.md` §4.1's
    /// rounding-bit table by delegating to [`Z::div_rem_rounded`] on the
    /// numerator/denominator pair.
    pub fn round(&self, mode: RoundingMode) -> Z {
        let (q, _) = self.numerator().div_rem_rounded(&self.denominator(), mode);
        q
    }

    /// Round to `places` decimal digits after the point, per the real
    /// calculator's `bround` (`comfunc.c`'s `qbround`), by scaling,
    /// rounding to an integer and scaling back.
    pub fn bround(&self, places: i64, mode: RoundingMode) -> Q {
        let scale = BigInt::from(10).pow(places.max(0) as u32);
        let scale_q = BigRational::from_integer(scale);
        let scaled = Q(&self.0 * &scale_q);
        let rounded = scaled.round(mode);
        Q(BigRational::from_integer(rounded.into_bigint()) / scale_q)
    }

    pub fn cmp_signed(&self, other: &Q) -> i32 {
        use std::cmp::Ordering::*;
        match self.0.cmp(&other.0) {
            Less => -1,
            Equal => 0,
            Greater => 1,
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        let (n, d) = (self.0.numer(), self.0.denom());
        Some(n.to_string().parse::<f64>().ok()? / d.to_string().parse::<f64>().ok()?)
    }

    pub fn as_big_rational(&self) -> &BigRational {
        &self.0
    }
}

impl fmt::Display for Q {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructs_in_lowest_terms() {
        let q = Q::new(Z::from_i64(6), Z::from_i64(4)).unwrap();
        assert_eq!(q.numerator(), Z::from_i64(3));
        assert_eq!(q.denominator(), Z::from_i64(2));
    }

    #[test]
    fn inverse_of_zero_is_none() {
        assert!(Q::zero().inv().is_none());
    }

    #[test]
    fn frac_and_int_recombine() {
        let q = Q::new(Z::from_i64(7), Z::from_i64(2)).unwrap();
        let recombined = Q::from_integer(q.int_part()).add(&q.frac_part());
        assert_eq!(recombined, q);
    }
}
