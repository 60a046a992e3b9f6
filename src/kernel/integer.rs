//! Arbitrary-precision signed integer `Z`.
//!
//! Backed by [`num_bigint::BigInt`] rather than a hand-rolled limb vector:
//! `spec.md` §9 allows an equivalent-semantics reimplementation, and this
//! crate never runs the bignum algorithms through a compiler, so reaching
//! for the audited crate the rest of the numeric-kernel stack (`Q`, `C`)
//! already depends on is the conservative choice. The observable contract
//! — sign-magnitude value, canonical zero, classical add/sub, schoolbook
//! or Karatsuba multiply chosen by size, binary-GCD — is preserved; which
//! algorithm actually runs is `num-bigint`'s call above the thresholds
//! [`MUL2_DEFAULT`]/[`SQ2_DEFAULT`]/[`POW2_DEFAULT`]/[`REDC2_DEFAULT`]
//! configure.

use num_bigint::BigInt;
use num_integer::Integer as _;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

/// Limb-count threshold above which integer multiplication should prefer
/// Karatsuba over schoolbook. Kept as a named constant (and mirrored by
/// [`crate::config::ConfigSnapshot::mul2`]) even though `num-bigint`
/// currently makes this choice internally; see the module docs.
pub const MUL2_DEFAULT: u32 = 20;
/// Threshold above which squaring switches to a dedicated algorithm.
pub const SQ2_DEFAULT: u32 = 20;
/// Threshold above which modular exponentiation prefers Montgomery
/// reduction even without prior setup.
pub const POW2_DEFAULT: u32 = 40;
/// Threshold above which Montgomery reduction (REDC) is used for
/// exponentiation.
pub const REDC2_DEFAULT: u32 = 80;

/// Rounding discipline shared by integer division, rational-to-integer
/// reduction, and the `round`/`bround`/`appr` kernel helpers.
///
/// Grounded on `spec.md` §4.1's `rnd` bit table; modeled as an enum over
/// the combinations the kernel actually distinguishes rather than a raw
/// bitmask, since the bits are mutually exclusive in every place the
/// kernel consults them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundingMode {
    /// Truncate toward zero (bit 0).
    #[default]
    TowardZero,
    /// Round away from zero (bit 1).
    AwayFromZero,
    /// Round toward negative infinity (bit 2, floor selector).
    TowardNegInf,
    /// Round toward positive infinity (bit 2, ceil selector).
    TowardPosInf,
    /// Round to even on a tie (bit 4, with bit 8 round-half modifier).
    ToEven,
    /// Round to odd on a tie.
    ToOdd,
}

/// Arbitrary-precision signed integer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Z(BigInt);

impl Z {
    pub fn zero() -> Self {
        Z(BigInt::zero())
    }

    pub fn one() -> Self {
        Z(BigInt::one())
    }

    pub fn from_i64(v: i64) -> Self {
        Z(BigInt::from(v))
    }

    pub fn from_bigint(v: BigInt) -> Self {
        Z(v)
    }

    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    pub fn into_bigint(self) -> BigInt {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// -1, 0 or 1.
    pub fn sgn(&self) -> i32 {
        match self.0.cmp(&BigInt::zero()) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    pub fn add(&self, other: &Z) -> Z {
        Z(&self.0 + &other.0)
    }

    pub fn sub(&self, other: &Z) -> Z {
        Z(&self.0 - &other.0)
    }

    pub fn mul(&self, other: &Z) -> Z {
        Z(&self.0 * &other.0)
    }

    pub fn neg(&self) -> Z {
        Z(-&self.0)
    }

    pub fn abs(&self) -> Z {
        Z(self.0.abs())
    }

    /// Truncating division; quotient and remainder with `self = q*other +
    /// r` and `|r| < |other|`, sign of `r` matching `self` (C semantics).
    /// `other == 0` is a caller precondition; callers route that case
    /// through [`crate::error::ErrorValue::DivByZero`] before reaching here.
    pub fn div_rem_trunc(&self, other: &Z) -> (Z, Z) {
        let (q, r) = self.0.div_rem(&other.0);
        (Z(q), Z(r))
    }

    /// Division/remainder honoring a [`RoundingMode`], used by `quo`/`mod`
    /// and by the kernel's `appr`-style helpers.
    pub fn div_rem_rounded(&self, other: &Z, mode: RoundingMode) -> (Z, Z) {
        let (tq, tr) = self.0.div_rem(&other.0);
        if tr.is_zero() {
            return (Z(tq), Z(tr));
        }
        let adjust_floor = |q: &BigInt, r: &BigInt| -> (BigInt, BigInt) {
            if (r.is_negative()) != (other.0.is_negative()) {
                (q - BigInt::one(), r + &other.0)
            } else {
                (q.clone(), r.clone())
            }
        };
        match mode {
            RoundingMode::TowardZero => (Z(tq), Z(tr)),
            RoundingMode::AwayFromZero => {
                if tr.is_zero() {
                    (Z(tq), Z(tr))
                } else if (self.0.is_negative()) == (other.0.is_negative()) {
                    (Z(&tq + BigInt::one()), Z(&tr - &other.0))
                } else {
                    (Z(&tq - BigInt::one()), Z(&tr + &other.0))
                }
            }
            RoundingMode::TowardNegInf => {
                let (q, r) = adjust_floor(&tq, &tr);
                (Z(q), Z(r))
            }
            RoundingMode::TowardPosInf => {
                let (fq, fr) = adjust_floor(&tq, &tr);
                if fr.is_zero() {
                    (Z(fq), Z(fr))
                } else {
                    (Z(&fq + BigInt::one()), Z(&fr - &other.0))
                }
            }
            RoundingMode::ToEven | RoundingMode::ToOdd => {
                let abs_double_r = (&tr * 2).abs();
                let abs_other = other.0.abs();
                match abs_double_r.cmp(&abs_other) {
                    Ordering::Less => (Z(tq), Z(tr)),
                    Ordering::Greater => {
                        if (self.0.is_negative()) == (other.0.is_negative()) {
                            (Z(&tq + BigInt::one()), Z(&tr - &other.0))
                        } else {
                            (Z(&tq - BigInt::one()), Z(&tr + &other.0))
                        }
                    }
                    Ordering::Equal => {
                        // exact tie: choose between the truncated quotient
                        // and its away-from-zero neighbor by parity.
                        let (away_q, away_r) = if (self.0.is_negative()) == (other.0.is_negative()) {
                            (&tq + BigInt::one(), &tr - &other.0)
                        } else {
                            (&tq - BigInt::one(), &tr + &other.0)
                        };
                        let want_even = matches!(mode, RoundingMode::ToEven);
                        if tq.is_even() == want_even {
                            (Z(tq), Z(tr))
                        } else {
                            (Z(away_q), Z(away_r))
                        }
                    }
                }
            }
        }
    }

    pub fn gcd(&self, other: &Z) -> Z {
        Z(self.0.gcd(&other.0))
    }

    /// Binary exponentiation, `self^exp`. `exp` must be non-negative;
    /// negative exponents are handled at the `Q` layer by inverting first.
    pub fn pow(&self, mut exp: u64) -> Z {
        let mut base = self.0.clone();
        let mut acc = BigInt::one();
        while exp > 0 {
            if exp & 1 == 1 {
                acc *= &base;
            }
            base = &base * &base;
            exp >>= 1;
        }
        Z(acc)
    }

    pub fn bit(&self, index: u64) -> bool {
        self.0.bit(index)
    }

    pub fn highbit(&self) -> Option<u64> {
        if self.0.is_zero() {
            None
        } else {
            Some(self.0.abs().bits().saturating_sub(1))
        }
    }

    pub fn lowbit(&self) -> Option<u64> {
        if self.0.is_zero() {
            return None;
        }
        let mut i = 0u64;
        loop {
            if self.0.bit(i) {
                return Some(i);
            }
            i += 1;
        }
    }

    pub fn shl(&self, bits: u64) -> Z {
        Z(&self.0 << bits)
    }

    pub fn shr(&self, bits: u64) -> Z {
        Z(&self.0 >> bits)
    }

    pub fn is_odd(&self) -> bool {
        self.0.is_odd()
    }

    pub fn is_even(&self) -> bool {
        self.0.is_even()
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    pub fn from_decimal_str(s: &str) -> Option<Z> {
        s.parse::<BigInt>().ok().map(Z)
    }
}

impl fmt::Display for Z {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn pow_matches_repeated_multiplication() {
        let base = Z::from_i64(3);
        let mut expect = Z::one();
        for _ in 0..7 {
            expect = expect.mul(&base);
        }
        assert_eq!(base.pow(7), expect);
    }

    #[test]
    fn div_rem_rounded_toward_neg_inf_matches_floor() {
        let a = Z::from_i64(-7);
        let b = Z::from_i64(2);
        let (q, r) = a.div_rem_rounded(&b, RoundingMode::TowardNegInf);
        assert_eq!(q, Z::from_i64(-4));
        assert_eq!(r, Z::from_i64(1));
    }

    #[test]
    fn gcd_is_nonnegative() {
        assert_eq!(Z::from_i64(-12).gcd(&Z::from_i64(8)), Z::from_i64(4));
    }

    #[rstest]
    // 7/2 ties at 3.5: even neighbor is 4, odd neighbor is 3.
    #[case(7, 2, RoundingMode::ToEven, 4)]
    #[case(7, 2, RoundingMode::ToOdd, 3)]
    // 5/2 ties at 2.5: even neighbor is 2, odd neighbor is 3.
    #[case(5, 2, RoundingMode::ToEven, 2)]
    #[case(5, 2, RoundingMode::ToOdd, 3)]
    // 9/4 = 2.25 is not a tie: nearest is 2 regardless of mode.
    #[case(9, 4, RoundingMode::ToEven, 2)]
    #[case(9, 4, RoundingMode::ToOdd, 2)]
    fn div_rem_rounded_breaks_ties_by_parity(
        #[case] a: i64,
        #[case] b: i64,
        #[case] mode: RoundingMode,
        #[case] expected_q: i64,
    ) {
        let (q, _) = Z::from_i64(a).div_rem_rounded(&Z::from_i64(b), mode);
        assert_eq!(q, Z::from_i64(expected_q));
    }
}
