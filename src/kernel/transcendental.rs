//! Transcendental functions to a requested rational epsilon, and the
//! process-wide `ln 2`/`ln 10` cache described in `spec.md` §4.1.2.

use crate::kernel::complex::C;
use crate::kernel::integer::Z;
use crate::kernel::rational::Q;

/// A cached transcendental constant: the epsilon it was computed to, and
/// the value. Reused whenever a later request's epsilon is no stricter.
#[derive(Debug, Clone)]
struct CachedConstant {
    epsilon: Q,
    value: Q,
}

impl CachedConstant {
    fn satisfies(&self, requested: &Q) -> bool {
        self.epsilon.sgn() != 0 && self.epsilon.cmp_signed(requested) <= 0
    }
}

/// Process-wide cache for `ln 2` and `ln 10`, owned by the interpreter
/// (see `spec.md` §5: no global statics, state lives on the owning value).
#[derive(Debug, Clone, Default)]
pub struct TranscendentalCache {
    ln2: Option<CachedConstant>,
    ln10: Option<CachedConstant>,
}

impl TranscendentalCache {
    pub fn new() -> Self {
        TranscendentalCache::default()
    }

    pub fn ln2(&mut self, epsilon: &Q) -> Q {
        if let Some(cached) = &self.ln2 {
            if cached.satisfies(epsilon) {
                return cached.value.clone();
            }
        }
        let value = ln_series(&Q::new(Z::from_i64(2), Z::one()).unwrap(), epsilon);
        self.ln2 = Some(CachedConstant {
            epsilon: epsilon.clone(),
            value: value.clone(),
        });
        value
    }

    pub fn ln10(&mut self, epsilon: &Q) -> Q {
        if let Some(cached) = &self.ln10 {
            if cached.satisfies(epsilon) {
                return cached.value.clone();
            }
        }
        let value = ln_series(&Q::new(Z::from_i64(10), Z::one()).unwrap(), epsilon);
        self.ln10 = Some(CachedConstant {
            epsilon: epsilon.clone(),
            value: value.clone(),
        });
        value
    }
}

/// Guard-bit count derived from the requested epsilon, per `spec.md`
/// §4.1.1: `n = ceil(log2(1/eps))` plus a fixed slack `k`.
fn guard_terms(epsilon: &Q) -> usize {
    let as_f64 = epsilon.to_f64().unwrap_or(1e-9).abs().max(1e-300);
    let n = (-as_f64.log2()).ceil().max(1.0) as usize;
    n + 8
}

/// Natural log of a positive rational via the Taylor series for
/// `ln((1+y)/(1-y)) = 2*atanh(y)`, `y = (x-1)/(x+1)`, which converges for
/// all `x > 0` and fastest near `x = 1` — exactly where `ln2`/`ln10` sit
/// after enough argument reduction in a full transcendental module.
pub(crate) fn ln_series(x: &Q, epsilon: &Q) -> Q {
    let one = Q::one();
    let y = x.sub(&one).div(&x.add(&one)).expect("x + 1 != 0 for x > 0");
    let y2 = y.mul(&y);
    let terms = guard_terms(epsilon);
    let mut sum = Q::zero();
    let mut power = y.clone();
    for k in 0..terms {
        let denom = Q::from_integer(Z::from_i64((2 * k + 1) as i64));
        sum = sum.add(&power.div(&denom).expect("odd denominator is never zero"));
        power = power.mul(&y2);
    }
    sum.scale(1)
}

/// Square root to within `epsilon`, via Newton iteration on `Q`. Returns
/// `None` for a negative argument (engine surfaces `E_SQRT`); callers that
/// need a complex result promote to [`C`] and call [`sqrt_complex`]
/// instead.
pub fn sqrt_q(x: &Q, epsilon: &Q) -> Option<Q> {
    if x.is_negative() {
        return None;
    }
    if x.is_zero() {
        return Some(Q::zero());
    }
    let two = Q::from_integer(Z::from_i64(2));
    let mut guess = x.clone();
    loop {
        let next = guess.add(&x.div(&guess)?).div(&two)?;
        let diff = next.sub(&guess).abs();
        guess = next;
        if diff.cmp_signed(epsilon) <= 0 {
            return Some(guess);
        }
    }
}

/// Complex square root: real sqrt of `|x|`, signed per `x`, else promote
/// to the principal branch `sqrt(r) * (cos(theta/2) + i sin(theta/2))`
/// computed through the real sqrt of the norm; negative reals return a
/// pure-imaginary result, matching calc's `sqrt` on negative numbers.
pub fn sqrt_complex(x: &C, epsilon: &Q) -> Option<C> {
    if x.is_real() {
        let r = &x.real;
        if !r.is_negative() {
            return sqrt_q(r, epsilon).map(C::from_real);
        }
        let mag = sqrt_q(&r.abs(), epsilon)?;
        return Some(C::new(Q::zero(), mag));
    }
    // General complex sqrt via the norm identity:
    // sqrt(a+bi) = sqrt((norm+a)/2) + sign(b) * sqrt((norm-a)/2) i
    let norm_mag = sqrt_q(&x.norm(), epsilon)?;
    let two = Q::from_integer(Z::from_i64(2));
    let re_sq = norm_mag.add(&x.real).div(&two)?;
    let im_sq = norm_mag.sub(&x.real).div(&two)?;
    let re = sqrt_q(&re_sq, epsilon)?;
    let mut im = sqrt_q(&im_sq, epsilon)?;
    if x.imag.is_negative() {
        im = im.neg();
    }
    Some(C::new(re, im))
}

/// Natural exponential to within `epsilon`, via argument halving (until
/// `|x| <= 1`) followed by a Taylor series and repeated squaring back up —
/// the same halve/Taylor/square shape `comfunc.c`'s `c_exp` uses to keep
/// the series short regardless of how large `x` is.
pub fn exp_q(x: &Q, epsilon: &Q) -> Q {
    let mut reduced = x.clone();
    let mut halvings = 0i64;
    let one = Q::one();
    while reduced.abs().cmp_signed(&one) > 0 {
        reduced = reduced.scale(-1);
        halvings += 1;
        if halvings > 64 {
            break;
        }
    }
    let eps_inner = epsilon.scale(-halvings - 4);
    let terms = guard_terms(&eps_inner) + 8;
    let mut sum = Q::one();
    let mut term = Q::one();
    for n in 1..=terms {
        term = term.mul(&reduced).div(&Q::from_integer(Z::from_i64(n as i64))).expect("n != 0");
        sum = sum.add(&term);
    }
    for _ in 0..halvings {
        sum = sum.square();
    }
    sum
}

/// Natural log, domain-checked wrapper over [`ln_series`].
pub fn ln_q(x: &Q, epsilon: &Q) -> Option<Q> {
    if x.is_negative() || x.is_zero() {
        None
    } else {
        Some(ln_series(x, epsilon))
    }
}

/// Base-10 log via `ln(x) / ln(10)`.
pub fn log10_q(x: &Q, epsilon: &Q) -> Option<Q> {
    let ln_x = ln_q(x, epsilon)?;
    let mut cache = TranscendentalCache::new();
    ln_x.div(&cache.ln10(epsilon))
}

/// Base-2 log via `ln(x) / ln(2)`.
pub fn log2_q(x: &Q, epsilon: &Q) -> Option<Q> {
    let ln_x = ln_q(x, epsilon)?;
    let mut cache = TranscendentalCache::new();
    ln_x.div(&cache.ln2(epsilon))
}

/// Taylor series for `(sin x, cos x)` around zero, valid for the small
/// reduced argument [`sincos_q`] hands it.
fn sincos_small(x: &Q, epsilon: &Q) -> (Q, Q) {
    let terms = guard_terms(epsilon) + 8;
    let mut cos_term = Q::one();
    let mut cos_sum = cos_term.clone();
    let mut sin_sum = Q::zero();
    for k in 0..terms {
        let sin_term = cos_term.mul(x).div(&Q::from_integer(Z::from_i64(2 * k as i64 + 1))).expect("odd denominator");
        sin_sum = sin_sum.add(&sin_term);
        cos_term = sin_term.mul(x).div(&Q::from_integer(Z::from_i64(2 * k as i64 + 2))).expect("even denominator").neg();
        cos_sum = cos_sum.add(&cos_term);
    }
    (sin_sum, cos_sum)
}

/// `(sin x, cos x)` to within `epsilon`, via argument halving down to
/// `|x| <= 1/2`, a Taylor series there, then the double-angle identities
/// back up — `comfunc.c`'s `c_sin`/`c_cos` share exactly this shape.
pub fn sincos_q(x: &Q, epsilon: &Q) -> (Q, Q) {
    let mut reduced = x.clone();
    let mut halvings = 0i64;
    let half = Q::new(Z::one(), Z::from_i64(2)).expect("2 != 0");
    while reduced.abs().cmp_signed(&half) > 0 {
        reduced = reduced.scale(-1);
        halvings += 1;
        if halvings > 64 {
            break;
        }
    }
    let eps_inner = epsilon.scale(-halvings - 4);
    let (mut s, mut c) = sincos_small(&reduced, &eps_inner);
    for _ in 0..halvings {
        let next_s = s.mul(&c).scale(1);
        let next_c = c.square().sub(&s.square());
        s = next_s;
        c = next_c;
    }
    (s, c)
}

pub fn sin_q(x: &Q, epsilon: &Q) -> Q {
    sincos_q(x, epsilon).0
}

pub fn cos_q(x: &Q, epsilon: &Q) -> Q {
    sincos_q(x, epsilon).1
}

pub fn tan_q(x: &Q, epsilon: &Q) -> Option<Q> {
    let (s, c) = sincos_q(x, epsilon);
    s.div(&c)
}

pub fn cot_q(x: &Q, epsilon: &Q) -> Option<Q> {
    let (s, c) = sincos_q(x, epsilon);
    c.div(&s)
}

pub fn sec_q(x: &Q, epsilon: &Q) -> Option<Q> {
    Q::one().div(&cos_q(x, epsilon))
}

pub fn csc_q(x: &Q, epsilon: &Q) -> Option<Q> {
    Q::one().div(&sin_q(x, epsilon))
}

/// Arctangent via Newton's method on `f(y) = sin y - x*cos y`, whose root
/// at fixed `x` is exactly `atan x` without a division ill-defined near
/// `y = pi/2`. Seeded at `x / (1 + |x|)`, a monotone map of the real line
/// into `(-1, 1)` that tracks `atan`'s shape closely enough for Newton to
/// converge in a handful of steps.
pub fn atan_q(x: &Q, epsilon: &Q) -> Q {
    if x.is_zero() {
        return Q::zero();
    }
    let mut y = x.div(&Q::one().add(&x.abs())).expect("1 + |x| != 0");
    for _ in 0..200 {
        let (s, c) = sincos_q(&y, epsilon);
        let f = s.sub(&x.mul(&c));
        let f_prime = c.add(&x.mul(&s));
        if f_prime.is_zero() {
            break;
        }
        let delta = f.div(&f_prime).expect("checked nonzero above");
        let next = y.sub(&delta);
        let converged = next.sub(&y).abs().cmp_signed(epsilon) <= 0;
        y = next;
        if converged {
            break;
        }
    }
    y
}

/// `pi/2` to within `epsilon`, computed as `2*atan(1)` rather than cached
/// as a literal — `calc` has no rational closed form for pi either.
fn half_pi_q(epsilon: &Q) -> Q {
    atan_q(&Q::one(), epsilon).scale(1)
}

/// Four-quadrant arctangent of `y/x`, used to recover the imaginary part
/// of [`ln_complex`]'s principal branch.
fn atan2_q(y: &Q, x: &Q, epsilon: &Q) -> Q {
    if x.is_zero() {
        return if y.is_negative() {
            half_pi_q(epsilon).neg()
        } else {
            half_pi_q(epsilon)
        };
    }
    let base = atan_q(&y.div(x).expect("checked nonzero above"), epsilon);
    if x.is_negative() {
        let pi = half_pi_q(epsilon).scale(1);
        if y.is_negative() {
            base.sub(&pi)
        } else {
            base.add(&pi)
        }
    } else {
        base
    }
}

pub fn asin_q(x: &Q, epsilon: &Q) -> Option<Q> {
    let one = Q::one();
    if x.abs().cmp_signed(&one) > 0 {
        return None;
    }
    if x.cmp_signed(&one) == 0 {
        return Some(half_pi_q(epsilon));
    }
    if x.cmp_signed(&one.neg()) == 0 {
        return Some(half_pi_q(epsilon).neg());
    }
    let under_root = one.sub(&x.square());
    let s = sqrt_q(&under_root, epsilon)?;
    Some(atan_q(&x.div(&s).expect("1 - x^2 != 0 here"), epsilon))
}

pub fn acos_q(x: &Q, epsilon: &Q) -> Option<Q> {
    Some(half_pi_q(epsilon).sub(&asin_q(x, epsilon)?))
}

pub fn acot_q(x: &Q, epsilon: &Q) -> Q {
    if x.is_zero() {
        return half_pi_q(epsilon);
    }
    let base = atan_q(&x.inv().expect("checked nonzero above"), epsilon);
    if x.is_negative() {
        base.add(&half_pi_q(epsilon).scale(1))
    } else {
        base
    }
}

pub fn asec_q(x: &Q, epsilon: &Q) -> Option<Q> {
    if x.abs().cmp_signed(&Q::one()) < 0 {
        return None;
    }
    acos_q(&x.inv().expect("|x| >= 1"), epsilon)
}

pub fn acsc_q(x: &Q, epsilon: &Q) -> Option<Q> {
    if x.abs().cmp_signed(&Q::one()) < 0 {
        return None;
    }
    asin_q(&x.inv().expect("|x| >= 1"), epsilon)
}

pub fn sinh_q(x: &Q, epsilon: &Q) -> Q {
    let e = exp_q(x, epsilon);
    let e_inv = e.inv().expect("exp is never zero");
    e.sub(&e_inv).scale(-1)
}

pub fn cosh_q(x: &Q, epsilon: &Q) -> Q {
    let e = exp_q(x, epsilon);
    let e_inv = e.inv().expect("exp is never zero");
    e.add(&e_inv).scale(-1)
}

pub fn tanh_q(x: &Q, epsilon: &Q) -> Q {
    sinh_q(x, epsilon).div(&cosh_q(x, epsilon)).expect("cosh >= 1")
}

pub fn coth_q(x: &Q, epsilon: &Q) -> Option<Q> {
    let s = sinh_q(x, epsilon);
    cosh_q(x, epsilon).div(&s)
}

pub fn sech_q(x: &Q, epsilon: &Q) -> Q {
    Q::one().div(&cosh_q(x, epsilon)).expect("cosh >= 1")
}

pub fn csch_q(x: &Q, epsilon: &Q) -> Option<Q> {
    Q::one().div(&sinh_q(x, epsilon))
}

pub fn asinh_q(x: &Q, epsilon: &Q) -> Q {
    let s = sqrt_q(&x.square().add(&Q::one()), epsilon).expect("x^2 + 1 > 0");
    ln_q(&x.add(&s), epsilon).expect("x + sqrt(x^2+1) > 0")
}

pub fn acosh_q(x: &Q, epsilon: &Q) -> Option<Q> {
    if x.cmp_signed(&Q::one()) < 0 {
        return None;
    }
    let s = sqrt_q(&x.square().sub(&Q::one()), epsilon)?;
    ln_q(&x.add(&s), epsilon)
}

pub fn atanh_q(x: &Q, epsilon: &Q) -> Option<Q> {
    if x.abs().cmp_signed(&Q::one()) >= 0 {
        return None;
    }
    let ratio = Q::one().add(x).div(&Q::one().sub(x))?;
    Some(ln_q(&ratio, epsilon)?.scale(-1))
}

pub fn acoth_q(x: &Q, epsilon: &Q) -> Option<Q> {
    if x.abs().cmp_signed(&Q::one()) <= 0 {
        return None;
    }
    let ratio = x.add(&Q::one()).div(&x.sub(&Q::one()))?;
    Some(ln_q(&ratio, epsilon)?.scale(-1))
}

pub fn asech_q(x: &Q, epsilon: &Q) -> Option<Q> {
    if x.is_zero() || x.cmp_signed(&Q::one()) > 0 || x.is_negative() {
        return None;
    }
    acosh_q(&x.inv()?, epsilon)
}

pub fn acsch_q(x: &Q, epsilon: &Q) -> Option<Q> {
    if x.is_zero() {
        return None;
    }
    Some(asinh_q(&x.inv()?, epsilon))
}

/// Gudermannian function, `gd(x) = atan(sinh x)`.
pub fn gd_q(x: &Q, epsilon: &Q) -> Q {
    atan_q(&sinh_q(x, epsilon), epsilon)
}

/// Inverse Gudermannian, `agd(y) = asinh(tan y)`.
pub fn agd_q(y: &Q, epsilon: &Q) -> Option<Q> {
    Some(asinh_q(&tan_q(y, epsilon)?, epsilon))
}

// Archaic trig family (`comfunc.c`'s `c_versin`/`c_coversin`/... group):
// half-versed and coversed sines, exsecant/excosecant, chord and `cas`.
// None of these get their own Newton solve; each is a direct algebraic
// combination of `sin`/`cos`.

pub fn versin_q(x: &Q, epsilon: &Q) -> Q {
    Q::one().sub(&cos_q(x, epsilon))
}

pub fn vercos_q(x: &Q, epsilon: &Q) -> Q {
    Q::one().add(&cos_q(x, epsilon))
}

pub fn coversin_q(x: &Q, epsilon: &Q) -> Q {
    Q::one().sub(&sin_q(x, epsilon))
}

pub fn covercos_q(x: &Q, epsilon: &Q) -> Q {
    Q::one().add(&sin_q(x, epsilon))
}

pub fn haversin_q(x: &Q, epsilon: &Q) -> Q {
    versin_q(x, epsilon).scale(-1)
}

pub fn havercos_q(x: &Q, epsilon: &Q) -> Q {
    vercos_q(x, epsilon).scale(-1)
}

pub fn hacoversin_q(x: &Q, epsilon: &Q) -> Q {
    coversin_q(x, epsilon).scale(-1)
}

pub fn hacovercos_q(x: &Q, epsilon: &Q) -> Q {
    covercos_q(x, epsilon).scale(-1)
}

pub fn exsec_q(x: &Q, epsilon: &Q) -> Option<Q> {
    Some(sec_q(x, epsilon)?.sub(&Q::one()))
}

pub fn excsc_q(x: &Q, epsilon: &Q) -> Option<Q> {
    Some(csc_q(x, epsilon)?.sub(&Q::one()))
}

/// Chord of the arc `x`, `2*sin(x/2)`.
pub fn chord_q(x: &Q, epsilon: &Q) -> Q {
    sin_q(&x.scale(-1), epsilon).scale(1)
}

/// `cas(x) = cos x + sin x`; `comfunc.c` never defines its inverse and
/// neither does this module.
pub fn cas_q(x: &Q, epsilon: &Q) -> Q {
    let (s, c) = sincos_q(x, epsilon);
    s.add(&c)
}

pub fn aversin_q(x: &Q, epsilon: &Q) -> Option<Q> {
    acos_q(&Q::one().sub(x), epsilon)
}

pub fn avercos_q(x: &Q, epsilon: &Q) -> Option<Q> {
    acos_q(&x.sub(&Q::one()), epsilon)
}

pub fn acoversin_q(x: &Q, epsilon: &Q) -> Option<Q> {
    asin_q(&Q::one().sub(x), epsilon)
}

pub fn acovercos_q(x: &Q, epsilon: &Q) -> Option<Q> {
    asin_q(&x.sub(&Q::one()), epsilon)
}

pub fn ahaversin_q(x: &Q, epsilon: &Q) -> Option<Q> {
    acos_q(&Q::one().sub(&x.scale(1)), epsilon)
}

pub fn ahavercos_q(x: &Q, epsilon: &Q) -> Option<Q> {
    acos_q(&x.scale(1).sub(&Q::one()), epsilon)
}

pub fn ahacoversin_q(x: &Q, epsilon: &Q) -> Option<Q> {
    asin_q(&Q::one().sub(&x.scale(1)), epsilon)
}

pub fn ahacovercos_q(x: &Q, epsilon: &Q) -> Option<Q> {
    asin_q(&x.scale(1).sub(&Q::one()), epsilon)
}

pub fn aexsec_q(x: &Q, epsilon: &Q) -> Option<Q> {
    asec_q(&x.add(&Q::one()), epsilon)
}

pub fn aexcsc_q(x: &Q, epsilon: &Q) -> Option<Q> {
    acsc_q(&x.add(&Q::one()), epsilon)
}

pub fn achord_q(x: &Q, epsilon: &Q) -> Option<Q> {
    Some(asin_q(&x.scale(-1), epsilon)?.scale(1))
}

// Complex mirrors. `comfunc.c` builds every complex transcendental out of
// `c_exp`/`c_ln` plus the real trig/hyperbolic kernel above, following the
// same logarithmic identities C99's `cacos`/`casinh`/etc. use; that's the
// shape kept here rather than re-deriving series for `C` directly.

pub fn exp_complex(z: &C, epsilon: &Q) -> C {
    let (s, c) = sincos_q(&z.imag, epsilon);
    let r = exp_q(&z.real, epsilon);
    C::new(r.mul(&c), r.mul(&s))
}

/// Principal branch: `ln|z| + i*atan2(b, a)`. `None` for `z == 0`.
pub fn ln_complex(z: &C, epsilon: &Q) -> Option<C> {
    if z.real.is_zero() && z.imag.is_zero() {
        return None;
    }
    let norm = z.norm();
    let ln_mag = ln_q(&norm, epsilon)?.scale(-1);
    let theta = atan2_q(&z.imag, &z.real, epsilon);
    Some(C::new(ln_mag, theta))
}

pub fn cos_complex(z: &C, epsilon: &Q) -> C {
    let (sa, ca) = sincos_q(&z.real, epsilon);
    let cb = cosh_q(&z.imag, epsilon);
    let sb = sinh_q(&z.imag, epsilon);
    C::new(ca.mul(&cb), sa.mul(&sb).neg())
}

pub fn sin_complex(z: &C, epsilon: &Q) -> C {
    let (sa, ca) = sincos_q(&z.real, epsilon);
    let cb = cosh_q(&z.imag, epsilon);
    let sb = sinh_q(&z.imag, epsilon);
    C::new(sa.mul(&cb), ca.mul(&sb))
}

pub fn tan_complex(z: &C, epsilon: &Q) -> Option<C> {
    sin_complex(z, epsilon).div(&cos_complex(z, epsilon))
}

pub fn sinh_complex(z: &C, epsilon: &Q) -> C {
    let (sb, cb) = sincos_q(&z.imag, epsilon);
    let sha = sinh_q(&z.real, epsilon);
    let cha = cosh_q(&z.real, epsilon);
    C::new(sha.mul(&cb), cha.mul(&sb))
}

pub fn cosh_complex(z: &C, epsilon: &Q) -> C {
    let (sb, cb) = sincos_q(&z.imag, epsilon);
    let sha = sinh_q(&z.real, epsilon);
    let cha = cosh_q(&z.real, epsilon);
    C::new(cha.mul(&cb), sha.mul(&sb))
}

pub fn tanh_complex(z: &C, epsilon: &Q) -> Option<C> {
    sinh_complex(z, epsilon).div(&cosh_complex(z, epsilon))
}

/// `cis(x) = cos x + i sin x = e^(ix)`; like `cas`, `comfunc.c` never
/// inverts it.
pub fn cis_complex(x: &Q, epsilon: &Q) -> C {
    let (s, c) = sincos_q(x, epsilon);
    C::new(c, s)
}

pub fn asinh_complex(z: &C, epsilon: &Q) -> Option<C> {
    let under_root = z.square().add(&C::from_real(Q::one()));
    let s = sqrt_complex(&under_root, epsilon)?;
    ln_complex(&z.add(&s), epsilon)
}

pub fn acosh_complex(z: &C, epsilon: &Q) -> Option<C> {
    let under_root = z.square().sub(&C::from_real(Q::one()));
    let s = sqrt_complex(&under_root, epsilon)?;
    ln_complex(&z.add(&s), epsilon)
}

pub fn atanh_complex(z: &C, epsilon: &Q) -> Option<C> {
    let num = C::from_real(Q::one()).add(z);
    let den = C::from_real(Q::one()).sub(z);
    let ratio = num.div(&den)?;
    Some(ln_complex(&ratio, epsilon)?.scale(-1))
}

/// `asin(z) = -i*ln(iz + sqrt(1 - z^2))`, the standard logarithmic form.
pub fn asin_complex(z: &C, epsilon: &Q) -> Option<C> {
    let i = C::new(Q::zero(), Q::one());
    let iz = i.mul(z);
    let under_root = C::from_real(Q::one()).sub(&z.square());
    let s = sqrt_complex(&under_root, epsilon)?;
    let l = ln_complex(&iz.add(&s), epsilon)?;
    // multiply by -i: (-i)*(a+bi) = b - a*i
    Some(C::new(l.imag, l.real.neg()))
}

pub fn acos_complex(z: &C, epsilon: &Q) -> Option<C> {
    Some(C::from_real(half_pi_q(epsilon)).sub(&asin_complex(z, epsilon)?))
}

/// `atan(z) = (-i/2)*ln((1+iz)/(1-iz))`.
pub fn atan_complex(z: &C, epsilon: &Q) -> Option<C> {
    let i = C::new(Q::zero(), Q::one());
    let iz = i.mul(z);
    let num = C::from_real(Q::one()).add(&iz);
    let den = C::from_real(Q::one()).sub(&iz);
    let ratio = num.div(&den)?;
    let l = ln_complex(&ratio, epsilon)?;
    // multiply by -i/2: (-i/2)*(a+bi) = b/2 - (a/2)*i
    Some(C::new(l.imag.scale(-1), l.real.neg().scale(-1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eps() -> Q {
        Q::new(Z::from_i64(1), Z::from_i64(1_000_000)).unwrap()
    }

    fn close(a: &Q, b: &Q) -> bool {
        a.sub(b).abs().cmp_signed(&eps()) <= 0
    }

    #[test]
    fn sqrt_four_is_near_two() {
        let four = Q::new(Z::from_i64(4), Z::one()).unwrap();
        let root = sqrt_q(&four, &eps()).unwrap();
        let diff = root.sub(&Q::new(Z::from_i64(2), Z::one()).unwrap()).abs();
        assert!(diff.cmp_signed(&eps()) <= 0);
    }

    #[test]
    fn ln2_cache_reuses_on_looser_request() {
        let mut cache = TranscendentalCache::new();
        let tight = Q::new(Z::one(), Z::from_i64(10_000_000)).unwrap();
        let loose = Q::new(Z::one(), Z::from_i64(10)).unwrap();
        let first = cache.ln2(&tight);
        let second = cache.ln2(&loose);
        assert_eq!(first, second);
    }

    #[test]
    fn sqrt_negative_real_is_pure_imaginary() {
        let neg_four = Q::new(Z::from_i64(-4), Z::one()).unwrap();
        let root = sqrt_complex(&C::from_real(neg_four), &eps()).unwrap();
        assert!(root.real.is_zero());
        assert!(!root.imag.is_zero());
    }

    fn q(n: i64, d: i64) -> Q {
        Q::new(Z::from_i64(n), Z::from_i64(d)).unwrap()
    }

    #[test]
    fn exp_of_zero_is_one() {
        assert!(close(&exp_q(&Q::zero(), &eps()), &Q::one()));
    }

    #[test]
    fn exp_and_ln_round_trip() {
        let x = q(3, 2);
        let e = exp_q(&x, &eps());
        let back = ln_q(&e, &eps()).unwrap();
        assert!(close(&back, &x));
    }

    #[test]
    fn exp_doubling_matches_squared_single_step() {
        let x = q(5, 1);
        let direct = exp_q(&x, &eps());
        let half = exp_q(&q(5, 2), &eps());
        assert!(close(&direct, &half.square()));
    }

    #[test]
    fn sin_squared_plus_cos_squared_is_one() {
        let x = q(7, 3);
        let (s, c) = sincos_q(&x, &eps());
        let sum = s.square().add(&c.square());
        assert!(close(&sum, &Q::one()));
    }

    #[test]
    fn sin_of_zero_is_zero() {
        assert!(sin_q(&Q::zero(), &eps()).is_zero());
    }

    #[test]
    fn tan_is_sin_over_cos() {
        let x = q(1, 4);
        let (s, c) = sincos_q(&x, &eps());
        let expected = s.div(&c).unwrap();
        assert!(close(&tan_q(&x, &eps()).unwrap(), &expected));
    }

    #[test]
    fn atan_of_one_is_near_quarter_pi() {
        // pi/4 ~= 0.7853981634
        let got = atan_q(&Q::one(), &eps());
        let expected = q(7853981634, 10_000_000_000);
        assert!(close(&got, &expected));
    }

    #[test]
    fn asin_and_sin_round_trip() {
        let x = q(2, 5);
        let s = sin_q(&x, &eps());
        let back = asin_q(&s, &eps()).unwrap();
        assert!(close(&back, &x));
    }

    #[test]
    fn asin_out_of_domain_is_none() {
        assert!(asin_q(&q(3, 2), &eps()).is_none());
    }

    #[test]
    fn acos_plus_asin_is_half_pi() {
        let x = q(1, 3);
        let total = acos_q(&x, &eps()).unwrap().add(&asin_q(&x, &eps()).unwrap());
        assert!(close(&total, &half_pi_q(&eps())));
    }

    #[test]
    fn sinh_cosh_identity_holds() {
        let x = q(11, 10);
        let ch = cosh_q(&x, &eps());
        let sh = sinh_q(&x, &eps());
        let diff = ch.square().sub(&sh.square());
        assert!(close(&diff, &Q::one()));
    }

    #[test]
    fn asinh_and_sinh_round_trip() {
        let x = q(-3, 4);
        let s = sinh_q(&x, &eps());
        let back = asinh_q(&s, &eps());
        assert!(close(&back, &x));
    }

    #[test]
    fn acosh_requires_domain_at_least_one() {
        assert!(acosh_q(&q(1, 2), &eps()).is_none());
        assert!(acosh_q(&Q::one(), &eps()).is_some());
    }

    #[test]
    fn atanh_and_tanh_round_trip() {
        let x = q(1, 5);
        let t = tanh_q(&x, &eps());
        let back = atanh_q(&t, &eps()).unwrap();
        assert!(close(&back, &x));
    }

    #[test]
    fn gudermannian_and_inverse_round_trip() {
        let x = q(3, 5);
        let y = gd_q(&x, &eps());
        let back = agd_q(&y, &eps()).unwrap();
        assert!(close(&back, &x));
    }

    #[test]
    fn versin_is_one_minus_cosine() {
        let x = q(5, 4);
        let expected = Q::one().sub(&cos_q(&x, &eps()));
        assert!(close(&versin_q(&x, &eps()), &expected));
    }

    #[test]
    fn haversin_is_half_of_versin() {
        let x = q(5, 4);
        let expected = versin_q(&x, &eps()).scale(-1);
        assert!(close(&haversin_q(&x, &eps()), &expected));
    }

    #[test]
    fn chord_matches_two_sin_half_angle() {
        let x = q(9, 10);
        let expected = sin_q(&x.scale(-1), &eps()).scale(1);
        assert!(close(&chord_q(&x, &eps()), &expected));
    }

    #[test]
    fn cas_is_sin_plus_cos() {
        let x = q(6, 5);
        let (s, c) = sincos_q(&x, &eps());
        assert!(close(&cas_q(&x, &eps()), &s.add(&c)));
    }

    #[test]
    fn aversin_and_versin_round_trip() {
        let x = q(1, 2);
        let v = versin_q(&x, &eps());
        let back = aversin_q(&v, &eps()).unwrap();
        assert!(close(&back, &x));
    }

    #[test]
    fn exp_complex_matches_real_on_zero_imaginary() {
        let z = C::from_real(q(3, 2));
        let got = exp_complex(&z, &eps());
        assert!(close(&got.real, &exp_q(&q(3, 2), &eps())));
        assert!(got.imag.is_zero());
    }

    #[test]
    fn ln_complex_and_exp_complex_round_trip() {
        let z = C::new(q(2, 1), q(1, 1));
        let l = ln_complex(&z, &eps()).unwrap();
        let back = exp_complex(&l, &eps());
        assert!(close(&back.real, &z.real));
        assert!(close(&back.imag, &z.imag));
    }

    #[test]
    fn cos_complex_squared_plus_sin_complex_squared_is_one() {
        let z = C::new(q(1, 3), q(2, 5));
        let sum = sin_complex(&z, &eps()).square().add(&cos_complex(&z, &eps()).square());
        assert!(close(&sum.real, &Q::one()));
        assert!(sum.imag.abs().cmp_signed(&eps()) <= 0);
    }

    #[test]
    fn cis_matches_cos_plus_i_sin() {
        let x = q(4, 7);
        let got = cis_complex(&x, &eps());
        assert!(close(&got.real, &cos_q(&x, &eps())));
        assert!(close(&got.imag, &sin_q(&x, &eps())));
    }

    #[test]
    fn asinh_complex_and_sinh_complex_round_trip() {
        let z = C::new(q(1, 4), q(-1, 3));
        let s = sinh_complex(&z, &eps());
        let back = asinh_complex(&s, &eps()).unwrap();
        assert!(close(&back.real, &z.real));
        assert!(close(&back.imag, &z.imag));
    }
}
