//! Algebraic-law property tests over the numeric kernel, the layer that
//! has no parser/opcode ceremony standing between it and a quickcheck
//! generator. Inputs are small integer pairs turned into exact rationals
//! rather than going through `Arbitrary` impls for `Q`/`C` (the kernel
//! doesn't have any, and doesn't need any outside of tests like these).

use calc_vm::kernel::{RoundingMode, C, Q, Z};
use quickcheck_macros::quickcheck;

fn q(n: i32, d: i32) -> Q {
    let d = if d == 0 { 1 } else { d };
    Q::new(Z::from_i64(n as i64), Z::from_i64(d as i64)).expect("nonzero denominator")
}

#[quickcheck]
fn rational_addition_is_commutative(an: i32, ad: i32, bn: i32, bd: i32) -> bool {
    let (a, b) = (q(an, ad), q(bn, bd));
    a.add(&b) == b.add(&a)
}

#[quickcheck]
fn rational_addition_is_associative(an: i32, ad: i32, bn: i32, bd: i32, cn: i32, cd: i32) -> bool {
    let (a, b, c) = (q(an, ad), q(bn, bd), q(cn, cd));
    a.add(&b).add(&c) == a.add(&b.add(&c))
}

#[quickcheck]
fn rational_multiplication_is_commutative(an: i32, ad: i32, bn: i32, bd: i32) -> bool {
    let (a, b) = (q(an, ad), q(bn, bd));
    a.mul(&b) == b.mul(&a)
}

#[quickcheck]
fn rational_negation_is_an_involution(n: i32, d: i32) -> bool {
    let a = q(n, d);
    a.neg().neg() == a
}

#[quickcheck]
fn complex_conjugation_is_an_involution(rn: i32, rd: i32, in_: i32, id: i32) -> bool {
    let c = C::new(q(rn, rd), q(in_, id));
    c.conj().conj() == c
}

#[quickcheck]
fn complex_negation_is_an_involution(rn: i32, rd: i32, in_: i32, id: i32) -> bool {
    let c = C::new(q(rn, rd), q(in_, id));
    c.neg().neg() == c
}

/// Rounding to a fixed number of decimal places is idempotent: rounding
/// an already-rounded value again changes nothing.
#[quickcheck]
fn bround_is_idempotent(n: i32, d: i32, places: u8) -> bool {
    let a = q(n, d);
    let places = (places % 12) as i64;
    let once = a.bround(places, RoundingMode::TowardZero);
    let twice = once.bround(places, RoundingMode::TowardZero);
    once == twice
}

/// Parsing the decimal string a rational prints back out reproduces the
/// same rational, for the integer-valued case `Display` always takes
/// (`spec.md` §3.1's canonical frac-mode printing).
#[quickcheck]
fn integer_valued_rational_print_parse_round_trips(n: i32) -> bool {
    let a = Q::from_integer(Z::from_i64(n as i64));
    let printed = a.to_string();
    let reparsed = Z::from_decimal_str(&printed).map(Q::from_integer);
    reparsed == Some(a)
}
