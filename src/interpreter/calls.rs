//! The small set of built-in (non-opcode) library functions reachable via
//! [`calc_asm::Opcode::Call`]. Real calc's resource-script builtins
//! (`strlen`, `fopen`, `system`, ...) are out of scope (no resource-file
//! loader in this workspace); this table covers the numeric-kernel and
//! hash/random builtins a compiled function's arithmetic actually needs
//! that don't already have a dedicated opcode.

use crate::kernel::{transcendental, RoundingMode, Q, C};
use crate::value::{HashAlgorithm, HashState, Value};
use calc_asm::ErrorCode;

/// A builtin's identity, indexed by `calc_asm::Opcode::Call::builtin`.
///
/// `Exp` through `Achord` cover `spec.md` §4.1's transcendental family
/// (exponential/log, circular, hyperbolic and the archaic half-versed /
/// exsecant / `cas` group), each dispatched to its `kernel::transcendental`
/// counterpart below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Builtin {
    Sqrt = 0,
    Root = 1,
    Ln = 2,
    Log = 3,
    Hash = 4,
    Min = 5,
    Max = 6,
    /// `round(x, places)`: decimal-place rounding, grounded in
    /// `comfunc.c`'s `qround`. Real calc's binary-place `bround` is left to
    /// an object's own `Overload::BRound` hook (`value/object.rs`) rather
    /// than a second builtin here, since nothing in this workspace's
    /// opcode inventory needs a base-2 rounding builtin directly.
    Round = 7,
    Exp = 8,
    Log2 = 9,
    Sin = 10,
    Cos = 11,
    Tan = 12,
    Cot = 13,
    Sec = 14,
    Csc = 15,
    Asin = 16,
    Acos = 17,
    Atan = 18,
    Acot = 19,
    Asec = 20,
    Acsc = 21,
    Sinh = 22,
    Cosh = 23,
    Tanh = 24,
    Coth = 25,
    Sech = 26,
    Csch = 27,
    Asinh = 28,
    Acosh = 29,
    Atanh = 30,
    Acoth = 31,
    Asech = 32,
    Acsch = 33,
    Gd = 34,
    Agd = 35,
    Versin = 36,
    Vercos = 37,
    Coversin = 38,
    Covercos = 39,
    Haversin = 40,
    Havercos = 41,
    Hacoversin = 42,
    Hacovercos = 43,
    Exsec = 44,
    Excsc = 45,
    Chord = 46,
    Cas = 47,
    Cis = 48,
    Aversin = 49,
    Avercos = 50,
    Acoversin = 51,
    Acovercos = 52,
    Ahaversin = 53,
    Ahavercos = 54,
    Ahacoversin = 55,
    Ahacovercos = 56,
    Aexsec = 57,
    Aexcsc = 58,
    Achord = 59,
}

impl Builtin {
    pub fn from_u32(n: u32) -> Option<Builtin> {
        use Builtin::*;
        Some(match n {
            0 => Sqrt,
            1 => Root,
            2 => Ln,
            3 => Log,
            4 => Hash,
            5 => Min,
            6 => Max,
            7 => Round,
            8 => Exp,
            9 => Log2,
            10 => Sin,
            11 => Cos,
            12 => Tan,
            13 => Cot,
            14 => Sec,
            15 => Csc,
            16 => Asin,
            17 => Acos,
            18 => Atan,
            19 => Acot,
            20 => Asec,
            21 => Acsc,
            22 => Sinh,
            23 => Cosh,
            24 => Tanh,
            25 => Coth,
            26 => Sech,
            27 => Csch,
            28 => Asinh,
            29 => Acosh,
            30 => Atanh,
            31 => Acoth,
            32 => Asech,
            33 => Acsch,
            34 => Gd,
            35 => Agd,
            36 => Versin,
            37 => Vercos,
            38 => Coversin,
            39 => Covercos,
            40 => Haversin,
            41 => Havercos,
            42 => Hacoversin,
            43 => Hacovercos,
            44 => Exsec,
            45 => Excsc,
            46 => Chord,
            47 => Cas,
            48 => Cis,
            49 => Aversin,
            50 => Avercos,
            51 => Acoversin,
            52 => Acovercos,
            53 => Ahaversin,
            54 => Ahavercos,
            55 => Ahacoversin,
            56 => Ahacovercos,
            57 => Aexsec,
            58 => Aexcsc,
            59 => Achord,
            _ => return None,
        })
    }
}

/// Evaluate a builtin call given its already-popped argument list (in
/// call order) and the interpreter's current epsilon.
pub fn call(builtin: Builtin, args: &[Value], epsilon: &Q) -> Value {
    use transcendental as t;
    match builtin {
        Builtin::Sqrt => sqrt(args, epsilon),
        Builtin::Root => root(args, epsilon),
        Builtin::Ln => partial_complex(args, epsilon, ErrorCode::Ln, t::ln_q, |c, e| t::ln_complex(c, e)),
        Builtin::Log => partial(args, epsilon, ErrorCode::Log, t::log10_q),
        Builtin::Hash => hash(args),
        Builtin::Min => fold(args, |a, b| if a.cmp_signed(b) <= 0 { a.clone() } else { b.clone() }),
        Builtin::Max => fold(args, |a, b| if a.cmp_signed(b) >= 0 { a.clone() } else { b.clone() }),
        Builtin::Round => round(args),
        Builtin::Exp => total(args, epsilon, ErrorCode::Exp, t::exp_q),
        Builtin::Log2 => partial(args, epsilon, ErrorCode::Log2, t::log2_q),
        Builtin::Sin => partial_complex(args, epsilon, ErrorCode::Sin, |x, e| Some(t::sin_q(x, e)), |c, e| {
            Some(t::sin_complex(c, e))
        }),
        Builtin::Cos => partial_complex(args, epsilon, ErrorCode::Cos, |x, e| Some(t::cos_q(x, e)), |c, e| {
            Some(t::cos_complex(c, e))
        }),
        Builtin::Tan => partial_complex(args, epsilon, ErrorCode::Tan, t::tan_q, t::tan_complex),
        Builtin::Cot => partial(args, epsilon, ErrorCode::Cot, t::cot_q),
        Builtin::Sec => partial(args, epsilon, ErrorCode::Sec, t::sec_q),
        Builtin::Csc => partial(args, epsilon, ErrorCode::Csc, t::csc_q),
        Builtin::Asin => partial_complex(args, epsilon, ErrorCode::Asin, t::asin_q, t::asin_complex),
        Builtin::Acos => partial_complex(args, epsilon, ErrorCode::Acos, t::acos_q, t::acos_complex),
        Builtin::Atan => partial_complex(args, epsilon, ErrorCode::Atan, |x, e| Some(t::atan_q(x, e)), t::atan_complex),
        Builtin::Acot => total(args, epsilon, ErrorCode::Acot, t::acot_q),
        Builtin::Asec => partial(args, epsilon, ErrorCode::Asec, t::asec_q),
        Builtin::Acsc => partial(args, epsilon, ErrorCode::Acsc, t::acsc_q),
        Builtin::Sinh => partial_complex(args, epsilon, ErrorCode::Sinh, |x, e| Some(t::sinh_q(x, e)), |c, e| {
            Some(t::sinh_complex(c, e))
        }),
        Builtin::Cosh => partial_complex(args, epsilon, ErrorCode::Cosh, |x, e| Some(t::cosh_q(x, e)), |c, e| {
            Some(t::cosh_complex(c, e))
        }),
        Builtin::Tanh => partial_complex(args, epsilon, ErrorCode::Tanh, |x, e| Some(t::tanh_q(x, e)), t::tanh_complex),
        Builtin::Coth => partial(args, epsilon, ErrorCode::Coth, t::coth_q),
        Builtin::Sech => total(args, epsilon, ErrorCode::Sech, t::sech_q),
        Builtin::Csch => partial(args, epsilon, ErrorCode::Csch, t::csch_q),
        Builtin::Asinh => partial_complex(args, epsilon, ErrorCode::Asinh, |x, e| Some(t::asinh_q(x, e)), t::asinh_complex),
        Builtin::Acosh => partial_complex(args, epsilon, ErrorCode::Acosh, t::acosh_q, t::acosh_complex),
        Builtin::Atanh => partial_complex(args, epsilon, ErrorCode::Atanh, t::atanh_q, t::atanh_complex),
        Builtin::Acoth => partial(args, epsilon, ErrorCode::Acoth, t::acoth_q),
        Builtin::Asech => partial(args, epsilon, ErrorCode::Asech, t::asech_q),
        Builtin::Acsch => partial(args, epsilon, ErrorCode::Acsch, t::acsch_q),
        Builtin::Gd => total(args, epsilon, ErrorCode::Gd, t::gd_q),
        Builtin::Agd => partial(args, epsilon, ErrorCode::Agd, t::agd_q),
        Builtin::Versin => total(args, epsilon, ErrorCode::Versin, t::versin_q),
        Builtin::Vercos => total(args, epsilon, ErrorCode::Vercos, t::vercos_q),
        Builtin::Coversin => total(args, epsilon, ErrorCode::Coversin, t::coversin_q),
        Builtin::Covercos => total(args, epsilon, ErrorCode::Covercos, t::covercos_q),
        Builtin::Haversin => total(args, epsilon, ErrorCode::Cos, t::haversin_q),
        Builtin::Havercos => total(args, epsilon, ErrorCode::Cos, t::havercos_q),
        Builtin::Hacoversin => total(args, epsilon, ErrorCode::Sin, t::hacoversin_q),
        Builtin::Hacovercos => total(args, epsilon, ErrorCode::Sin, t::hacovercos_q),
        Builtin::Exsec => partial(args, epsilon, ErrorCode::Sec, t::exsec_q),
        Builtin::Excsc => partial(args, epsilon, ErrorCode::Csc, t::excsc_q),
        Builtin::Chord => total(args, epsilon, ErrorCode::Sin, t::chord_q),
        Builtin::Cas => total(args, epsilon, ErrorCode::Sin, t::cas_q),
        Builtin::Cis => match args.first().and_then(Value::as_q) {
            Some(x) => Value::from_c(t::cis_complex(&x, epsilon)),
            None => Value::error(ErrorCode::Exp),
        },
        Builtin::Aversin => partial(args, epsilon, ErrorCode::Aversin, t::aversin_q),
        Builtin::Avercos => partial(args, epsilon, ErrorCode::Avercos, t::avercos_q),
        Builtin::Acoversin => partial(args, epsilon, ErrorCode::Acoversin, t::acoversin_q),
        Builtin::Acovercos => partial(args, epsilon, ErrorCode::Acovercos, t::acovercos_q),
        Builtin::Ahaversin => partial(args, epsilon, ErrorCode::Acos, t::ahaversin_q),
        Builtin::Ahavercos => partial(args, epsilon, ErrorCode::Acos, t::ahavercos_q),
        Builtin::Ahacoversin => partial(args, epsilon, ErrorCode::Asin, t::ahacoversin_q),
        Builtin::Ahacovercos => partial(args, epsilon, ErrorCode::Asin, t::ahacovercos_q),
        Builtin::Aexsec => partial(args, epsilon, ErrorCode::Asec, t::aexsec_q),
        Builtin::Aexcsc => partial(args, epsilon, ErrorCode::Acsc, t::aexcsc_q),
        Builtin::Achord => partial(args, epsilon, ErrorCode::Asin, t::achord_q),
    }
}

/// Builtins whose kernel function is defined for every rational input
/// (the exponential, circular/hyperbolic primitives, the archaic trig
/// family) dispatch through here; only a non-numeric argument fails.
fn total(args: &[Value], epsilon: &Q, err: ErrorCode, f: impl Fn(&Q, &Q) -> Q) -> Value {
    match args.first().and_then(Value::as_q) {
        Some(x) => Value::num(f(&x, epsilon)),
        None => Value::error(err),
    }
}

/// Builtins whose kernel function can refuse a rational argument outside
/// its domain (the inverse trig/hyperbolic family, `log`/`log2`) and have
/// no complex promotion wired up.
fn partial(args: &[Value], epsilon: &Q, err: ErrorCode, f: impl Fn(&Q, &Q) -> Option<Q>) -> Value {
    match args.first().and_then(Value::as_q) {
        Some(x) => match f(&x, epsilon) {
            Some(r) => Value::num(r),
            None => Value::error(err),
        },
        None => Value::error(err),
    }
}

/// Like [`partial`], but falls back to the complex kernel function when
/// the rational one refuses the argument (mirrors [`sqrt`]'s own
/// promote-to-`C`-on-domain-failure shape).
fn partial_complex(
    args: &[Value],
    epsilon: &Q,
    err: ErrorCode,
    qf: impl Fn(&Q, &Q) -> Option<Q>,
    cf: impl Fn(&C, &Q) -> Option<C>,
) -> Value {
    if let Some(x) = args.first().and_then(Value::as_q) {
        if let Some(r) = qf(&x, epsilon) {
            return Value::num(r);
        }
    }
    match args.first().and_then(Value::as_c) {
        Some(c) => match cf(&c, epsilon) {
            Some(r) => Value::from_c(r),
            None => Value::error(err),
        },
        None => Value::error(err),
    }
}

fn round(args: &[Value]) -> Value {
    let x = match args.first().and_then(Value::as_q) {
        Some(x) => x,
        None => return Value::error(ErrorCode::Round),
    };
    let places = args.get(1).and_then(Value::as_int).unwrap_or(0);
    Value::num(x.bround(places, RoundingMode::default()))
}

fn sqrt(args: &[Value], epsilon: &Q) -> Value {
    let x = match args.first().and_then(Value::as_q) {
        Some(x) => x,
        None => return Value::error(ErrorCode::Sqrt),
    };
    match transcendental::sqrt_q(&x, epsilon) {
        Some(root) => Value::num(root),
        None => match args.first().and_then(Value::as_c) {
            Some(c) => match transcendental::sqrt_complex(&c, epsilon) {
                Some(r) => Value::from_c(r),
                None => Value::error(ErrorCode::Sqrt),
            },
            None => Value::error(ErrorCode::Sqrt),
        },
    }
}

fn root(args: &[Value], epsilon: &Q) -> Value {
    let (x, n) = match (args.first().and_then(Value::as_q), args.get(1).and_then(Value::as_int)) {
        (Some(x), Some(n)) if n > 0 => (x, n),
        _ => return Value::error(ErrorCode::Root),
    };
    if n == 2 {
        return sqrt(&args[..1], epsilon);
    }
    // Newton's method on f(y) = y^n - x.
    let mut y = Q::one();
    for _ in 0..200 {
        let y_pow = match y.pow(n - 1) {
            Some(p) => p,
            None => return Value::error(ErrorCode::Root),
        };
        let numerator = y.mul(&y_pow).sub(&x);
        let denom = Q::from_integer(crate::kernel::Z::from_i64(n)).mul(&y_pow);
        if denom.is_zero() {
            break;
        }
        let delta = match numerator.div(&denom) {
            Some(d) => d,
            None => break,
        };
        let next = y.sub(&delta);
        if next.sub(&y).abs().cmp_signed(epsilon) <= 0 {
            y = next;
            break;
        }
        y = next;
    }
    Value::num(y)
}

/// `hash(algorithm_name, value...)`: one-shot hash of the structural byte
/// representation of the remaining arguments. `spec.md` §4.2.6 allows a
/// standing `Value::Hash` state to be built incrementally via `update`;
/// this builtin is the convenience one-call form real calc exposes as
/// `hash()`.
fn hash(args: &[Value]) -> Value {
    let algorithm = match args.first() {
        Some(v) => match v.body() {
            crate::value::ValueBody::Str(s) => match s.as_slice() {
                b"md5" => HashAlgorithm::Md5,
                b"sha1" => HashAlgorithm::Sha1,
                b"shs" => HashAlgorithm::Shs,
                b"sha3" => HashAlgorithm::Sha3,
                _ => return Value::error(ErrorCode::Sgn),
            },
            _ => return Value::error(ErrorCode::Sgn),
        },
        None => return Value::error(ErrorCode::Sgn),
    };
    let mut state = HashState::new(algorithm);
    for v in &args[1..] {
        state.update(&crate::dispatch::hashing::quickhash_value(v).to_le_bytes());
    }
    Value::num(Q::from_integer(state.finalize()))
}

fn fold(args: &[Value], pick: impl Fn(&Q, &Q) -> Q) -> Value {
    let mut values = args.iter().filter_map(Value::as_q);
    let first = match values.next() {
        Some(v) => v,
        None => return Value::error(ErrorCode::Sgn),
    };
    Value::num(values.fold(first, |acc, v| pick(&acc, &v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::Z;

    fn epsilon() -> Q {
        Q::new(Z::one(), Z::from_i64(1_000_000_000)).unwrap()
    }

    #[test]
    fn sqrt_of_four_is_near_two() {
        let args = [Value::int(4)];
        let v = sqrt(&args, &epsilon());
        let q = v.as_q().unwrap();
        let diff = q.sub(&Q::new(Z::from_i64(2), Z::one()).unwrap()).abs();
        assert!(diff.cmp_signed(&epsilon()) <= 0);
    }

    #[test]
    fn min_and_max_fold_a_list_of_numbers() {
        let args = [Value::int(3), Value::int(-5), Value::int(9)];
        assert_eq!(call(Builtin::Min, &args, &epsilon()).as_int(), Some(-5));
        assert_eq!(call(Builtin::Max, &args, &epsilon()).as_int(), Some(9));
    }

    #[test]
    fn round_truncates_to_the_requested_decimal_places() {
        let third = Value::num(Q::new(Z::one(), Z::from_i64(3)).unwrap());
        let args = [third, Value::int(2)];
        let rounded = call(Builtin::Round, &args, &epsilon());
        assert_eq!(rounded.as_q().unwrap(), Q::new(Z::from_i64(33), Z::from_i64(100)).unwrap());
    }

    #[test]
    fn ln_of_a_negative_number_is_an_error() {
        let args = [Value::int(-1)];
        let result = call(Builtin::Ln, &args, &epsilon());
        assert_eq!(result.as_error(), Some(ErrorCode::Ln));
    }

    #[test]
    fn exp_of_zero_is_one() {
        let args = [Value::int(0)];
        let result = call(Builtin::Exp, &args, &epsilon());
        assert_eq!(result.as_q(), Some(Q::one()));
    }

    #[test]
    fn sin_of_zero_is_zero() {
        let args = [Value::int(0)];
        let result = call(Builtin::Sin, &args, &epsilon());
        assert_eq!(result.as_q(), Some(Q::zero()));
    }

    #[test]
    fn log_of_a_non_numeric_argument_is_an_error() {
        let args: [Value; 0] = [];
        assert_eq!(call(Builtin::Log, &args, &epsilon()).as_error(), Some(ErrorCode::Log));
        assert_eq!(call(Builtin::Log2, &args, &epsilon()).as_error(), Some(ErrorCode::Log2));
    }

    #[test]
    fn asin_out_of_q_domain_is_a_domain_error_without_a_complex_argument() {
        let third_half = Q::new(Z::from_i64(3), Z::from_i64(2)).unwrap();
        let args = [Value::num(third_half)];
        let result = call(Builtin::Asin, &args, &epsilon());
        assert_eq!(result.as_error(), Some(ErrorCode::Asin));
    }

    #[test]
    fn cis_builds_a_unit_complex_value() {
        let args = [Value::int(0)];
        let result = call(Builtin::Cis, &args, &epsilon());
        let c = result.as_c().unwrap();
        assert_eq!(c.real, Q::one());
        assert_eq!(c.imag, Q::zero());
    }
}
