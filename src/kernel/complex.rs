//! Gaussian-rational complex `C = real + imag*i`, both parts exact `Q`.

use crate::kernel::rational::Q;
use std::fmt;

/// Complex number over the rationals. A `C` with `imag == 0` is collapsed
/// back to `Q` at the value-layer boundary (`spec.md` §3.1), never here:
/// the kernel itself is allowed to carry a zero imaginary part internally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct C {
    pub real: Q,
    pub imag: Q,
}

impl C {
    pub fn new(real: Q, imag: Q) -> Self {
        C { real, imag }
    }

    pub fn from_real(real: Q) -> Self {
        C {
            real,
            imag: Q::zero(),
        }
    }

    pub fn is_real(&self) -> bool {
        self.imag.is_zero()
    }

    pub fn zero() -> Self {
        C::from_real(Q::zero())
    }

    pub fn add(&self, other: &C) -> C {
        C::new(self.real.add(&other.real), self.imag.add(&other.imag))
    }

    pub fn sub(&self, other: &C) -> C {
        C::new(self.real.sub(&other.real), self.imag.sub(&other.imag))
    }

    /// `(ac - bd) + (ad + bc)i`.
    pub fn mul(&self, other: &C) -> C {
        let a = &self.real;
        let b = &self.imag;
        let c = &other.real;
        let d = &other.imag;
        let real = a.mul(c).sub(&b.mul(d));
        let imag = a.mul(d).add(&b.mul(c));
        C::new(real, imag)
    }

    pub fn neg(&self) -> C {
        C::new(self.real.neg(), self.imag.neg())
    }

    pub fn conj(&self) -> C {
        C::new(self.real.clone(), self.imag.neg())
    }

    /// `a^2 + b^2`, as an exact `Q`.
    pub fn norm(&self) -> Q {
        self.real.square().add(&self.imag.square())
    }

    /// Division by multiplying through the conjugate of `other`. `None`
    /// when `other` is zero.
    pub fn div(&self, other: &C) -> Option<C> {
        let denom = other.norm();
        if denom.is_zero() {
            return None;
        }
        let numerator = self.mul(&other.conj());
        Some(C::new(
            numerator.real.div(&denom)?,
            numerator.imag.div(&denom)?,
        ))
    }

    /// Multiplicative inverse via `conj(self) / norm(self)`.
    pub fn inv(&self) -> Option<C> {
        C::from_real(Q::one()).div(self)
    }

    pub fn square(&self) -> C {
        self.mul(self)
    }

    pub fn scale(&self, exp: i64) -> C {
        C::new(self.real.scale(exp), self.imag.scale(exp))
    }

    /// Collapse to `Q` if the imaginary part is exactly zero.
    pub fn collapse(self) -> Result<Q, C> {
        if self.imag.is_zero() {
            Ok(self.real)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for C {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.imag.is_negative() {
            write!(f, "{}-{}i", self.real, self.imag.abs())
        } else {
            write!(f, "{}+{}i", self.real, self.imag)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::integer::Z;

    fn q(n: i64, d: i64) -> Q {
        Q::new(Z::from_i64(n), Z::from_i64(d)).unwrap()
    }

    #[test]
    fn mul_matches_three_multiplication_scheme() {
        let a = C::new(q(2, 1), q(3, 1));
        let b = C::new(q(1, 1), q(-1, 1));
        let got = a.mul(&b);
        assert_eq!(got.real, q(5, 1));
        assert_eq!(got.imag, q(1, 1));
    }

    #[test]
    fn div_by_self_is_one() {
        let a = C::new(q(3, 1), q(4, 1));
        let one = a.div(&a).unwrap();
        assert_eq!(one.collapse(), Ok(Q::one()));
    }

    #[test]
    fn real_collapses() {
        let a = C::from_real(q(5, 1));
        assert_eq!(a.collapse(), Ok(q(5, 1)));
    }
}
