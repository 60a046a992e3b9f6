//! The two pseudo-random generator value kinds `spec.md` §3.2 names:
//! a subtractive-100 generator (`Value::Rand`) and a Blum-Blum-Shub
//! generator (`Value::Random`). Both are deterministic arithmetic
//! generators specified by exact algorithm, not general-purpose
//! randomness, so neither reaches for the `rand` crate: that crate has no
//! subtractive-100 or BBS implementation to reuse, and reimplementing the
//! named algorithm directly is what preserves the documented output
//! sequence.

use crate::kernel::{integer::Z, rational::Q};
use num_bigint::BigInt;
use num_integer::Integer as _;
use num_traits::Zero;

const SUBTRACTIVE_TABLE_SIZE: usize = 100;

/// Additive/subtractive lagged-Fibonacci generator in the style of
/// Knuth's subtractive-100 (the classical `rand()` calc uses before
/// `srandom` switches to the cryptographic generator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandState {
    table: [u32; SUBTRACTIVE_TABLE_SIZE],
    i: usize,
    j: usize,
}

impl RandState {
    pub fn seeded(seed: u64) -> Self {
        let mut table = [0u32; SUBTRACTIVE_TABLE_SIZE];
        let mut x = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        for slot in table.iter_mut() {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            *slot = (x >> 16) as u32;
        }
        RandState { table, i: 0, j: 63 }
    }

    /// Next 32-bit word of the sequence.
    pub fn next_u32(&mut self) -> u32 {
        let value = self.table[self.i].wrapping_sub(self.table[self.j]);
        self.table[self.i] = value;
        self.i = (self.i + 1) % SUBTRACTIVE_TABLE_SIZE;
        self.j = (self.j + 1) % SUBTRACTIVE_TABLE_SIZE;
        value
    }

    /// A non-negative integer strictly below `bound`.
    pub fn next_below(&mut self, bound: &Z) -> Z {
        if bound.is_zero() || bound.is_negative() {
            return Z::zero();
        }
        let word = self.next_u32();
        Z::from_i64((word as i64) % bound.to_i64().unwrap_or(i64::MAX).max(1))
    }
}

/// Blum-Blum-Shub generator: `x_{n+1} = x_n^2 mod M`, `M = p*q` for
/// large primes `p ≡ q ≡ 3 (mod 4)`. Bits are extracted from the low end
/// of successive states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomState {
    modulus: BigInt,
    state: BigInt,
}

impl RandomState {
    pub fn new(modulus: Z, seed: Z) -> Self {
        let modulus = modulus.into_bigint();
        let state = seed.into_bigint().mod_floor(&modulus);
        RandomState { modulus, state }
    }

    pub fn next_bit(&mut self) -> bool {
        self.state = (&self.state * &self.state).mod_floor(&self.modulus);
        self.state.bit(0)
    }

    /// `count` bits packed into a non-negative integer, most significant
    /// bit first.
    pub fn next_bits(&mut self, count: u32) -> Q {
        let mut acc = BigInt::zero();
        for _ in 0..count {
            acc <<= 1;
            if self.next_bit() {
                acc |= BigInt::from(1u8);
            }
        }
        Q::from_integer(Z::from_bigint(acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtractive_generator_is_deterministic_for_a_seed() {
        let mut a = RandState::seeded(42);
        let mut b = RandState::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn bbs_generator_is_deterministic_for_a_seed() {
        let modulus = Z::from_i64(9409); // 97 * 97, for test purposes only
        let mut a = RandomState::new(modulus.clone(), Z::from_i64(11));
        let mut b = RandomState::new(modulus, Z::from_i64(11));
        for _ in 0..5 {
            assert_eq!(a.next_bit(), b.next_bit());
        }
    }
}
