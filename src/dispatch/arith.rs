//! Arithmetic dispatch: `spec.md` §4.2's seven-path operand-tag dispatch,
//! specialized to the unary/binary arithmetic opcodes of §4.3.2.

use crate::dispatch::DispatchOutcome;
use crate::kernel::{C, Q, Z};
use crate::value::object::Overload;
use crate::value::{Value, ValueBody};
use calc_asm::ErrorCode;

fn err(code: ErrorCode) -> DispatchOutcome {
    DispatchOutcome::Value(Value::error(code))
}

/// If either operand is already an Error, propagate it (left operand
/// wins when both are), per `spec.md` §7's "choose the left operand if
/// both are errors".
fn propagate_error(a: &Value, b: &Value) -> Option<DispatchOutcome> {
    if let Some(code) = a.as_error() {
        return Some(DispatchOutcome::Value(Value::error(code)));
    }
    if let Some(code) = b.as_error() {
        return Some(DispatchOutcome::Value(Value::error(code)));
    }
    None
}

/// Object-path fallback: look up `op` in `obj`'s schema; if bound, ask
/// the caller to invoke it; if unbound, a typed Error.
fn object_path(obj: &crate::value::Object, op: Overload, args: Vec<Value>, unbound: ErrorCode) -> DispatchOutcome {
    match obj.schema.lookup(op) {
        Some(func_index) => DispatchOutcome::CallOverload { func_index, args },
        None => err(unbound),
    }
}

/// The operand carrying the object/overload schema, per `spec.md` §4.2
/// path 5: either side may be `Obj`; the left operand's schema wins when
/// both are.
fn obj_operand<'a>(a: &'a Value, b: &'a Value) -> Option<&'a crate::value::Object> {
    if let ValueBody::Obj(obj) = a.body() {
        return Some(obj);
    }
    if let ValueBody::Obj(obj) = b.body() {
        return Some(obj);
    }
    None
}

/// Machine-word fast path: when both operands are already native `Int`
/// and the checked i64 operation doesn't overflow, stay in `Int` rather
/// than promoting to the arbitrary-precision `Num` representation.
/// Overflow falls through to the caller's `Q`-based path, which never
/// overflows.
fn int_fast_path(a: &Value, b: &Value, op: impl Fn(i64, i64) -> Option<i64>) -> Option<Value> {
    match (a.body(), b.body()) {
        (ValueBody::Int(x), ValueBody::Int(y)) => op(*x, *y).map(Value::int),
        _ => None,
    }
}

/// Shared binary-numeric promotion: kernel fast path on `Q`, promoted
/// path on `C` when either side is complex.
fn binary_numeric(
    a: &Value,
    b: &Value,
    q_op: impl Fn(&Q, &Q) -> Option<Q>,
    c_op: impl Fn(&C, &C) -> Option<C>,
) -> Option<Value> {
    if let (Some(qa), Some(qb)) = (a.as_q(), b.as_q()) {
        if !matches!(a.body(), ValueBody::Com(_)) && !matches!(b.body(), ValueBody::Com(_)) {
            return q_op(&qa, &qb).map(Value::num);
        }
    }
    let (ca, cb) = (a.as_c()?, b.as_c()?);
    c_op(&ca, &cb).map(Value::from_c)
}

pub fn add(a: &Value, b: &Value) -> DispatchOutcome {
    if let Some(out) = propagate_error(a, b) {
        return out;
    }
    if let Some(v) = int_fast_path(a, b, i64::checked_add) {
        return DispatchOutcome::Value(v);
    }
    if let Some(v) = binary_numeric(a, b, |x, y| Some(x.add(y)), |x, y| Some(x.add(y))) {
        return DispatchOutcome::Value(v);
    }
    if let (ValueBody::Str(x), ValueBody::Str(y)) = (a.body(), b.body()) {
        let mut out = (**x).clone();
        out.extend_from_slice(y);
        return DispatchOutcome::Value(Value::string(out));
    }
    if let (ValueBody::Mat(ma), ValueBody::Mat(mb)) = (a.body(), b.body()) {
        return crate::dispatch::matrix::add(ma, mb);
    }
    if let Some(obj) = obj_operand(a, b) {
        return object_path(obj, Overload::Add, vec![a.clone(), b.clone()], ErrorCode::Add);
    }
    err(ErrorCode::Add)
}

pub fn sub(a: &Value, b: &Value) -> DispatchOutcome {
    if let Some(out) = propagate_error(a, b) {
        return out;
    }
    if let Some(v) = int_fast_path(a, b, i64::checked_sub) {
        return DispatchOutcome::Value(v);
    }
    if let Some(v) = binary_numeric(a, b, |x, y| Some(x.sub(y)), |x, y| Some(x.sub(y))) {
        return DispatchOutcome::Value(v);
    }
    if let (ValueBody::Str(x), ValueBody::Str(y)) = (a.body(), b.body()) {
        // Remove leftmost non-overlapping occurrences of `y` from `x`.
        if y.is_empty() {
            return DispatchOutcome::Value(Value::string((**x).clone()));
        }
        let mut out = Vec::with_capacity(x.len());
        let mut i = 0;
        while i < x.len() {
            if x[i..].starts_with(y.as_slice()) {
                i += y.len();
            } else {
                out.push(x[i]);
                i += 1;
            }
        }
        return DispatchOutcome::Value(Value::string(out));
    }
    if let Some(obj) = obj_operand(a, b) {
        return object_path(obj, Overload::Sub, vec![a.clone(), b.clone()], ErrorCode::Sub);
    }
    err(ErrorCode::Sub)
}

pub fn mul(a: &Value, b: &Value) -> DispatchOutcome {
    if let Some(out) = propagate_error(a, b) {
        return out;
    }
    if let Some(v) = int_fast_path(a, b, i64::checked_mul) {
        return DispatchOutcome::Value(v);
    }
    if let Some(v) = binary_numeric(a, b, |x, y| Some(x.mul(y)), |x, y| Some(x.mul(y))) {
        return DispatchOutcome::Value(v);
    }
    if let (ValueBody::Str(x), ValueBody::Int(n)) | (ValueBody::Int(n), ValueBody::Str(x)) =
        (a.body(), b.body())
    {
        if *n < 0 {
            return err(ErrorCode::Mul);
        }
        let mut out = Vec::with_capacity(x.len() * (*n as usize));
        for _ in 0..*n {
            out.extend_from_slice(x);
        }
        return DispatchOutcome::Value(Value::string(out));
    }
    if let Some(out) = crate::dispatch::matrix::mul(a, b) {
        return out;
    }
    if let Some(obj) = obj_operand(a, b) {
        return object_path(obj, Overload::Mul, vec![a.clone(), b.clone()], ErrorCode::Mul);
    }
    err(ErrorCode::Mul)
}

pub fn div(a: &Value, b: &Value) -> DispatchOutcome {
    if let Some(out) = propagate_error(a, b) {
        return out;
    }
    if a.is_numeric() && b.is_numeric() {
        let b_is_zero = b.as_q().map(|q| q.is_zero()).unwrap_or(false);
        if b_is_zero {
            let a_is_zero = a.as_q().map(|q| q.is_zero()).unwrap_or(false);
            return err(if a_is_zero {
                ErrorCode::ZeroDivZero
            } else {
                ErrorCode::DivByZero
            });
        }
        if let Some(v) = binary_numeric(a, b, |x, y| x.div(y), |x, y| x.div(y)) {
            return DispatchOutcome::Value(v);
        }
    }
    if let Some(obj) = obj_operand(a, b) {
        return object_path(obj, Overload::Div, vec![a.clone(), b.clone()], ErrorCode::Div);
    }
    err(ErrorCode::Div)
}

pub fn negate(a: &Value) -> DispatchOutcome {
    if let Some(code) = a.as_error() {
        return DispatchOutcome::Value(Value::error(code));
    }
    match a.body() {
        ValueBody::Int(v) => DispatchOutcome::Value(Value::num(Q::from_integer(Z::from_i64(-*v)))),
        ValueBody::Num(q) => DispatchOutcome::Value(Value::num(q.neg())),
        ValueBody::Com(c) => DispatchOutcome::Value(Value::from_c(c.neg())),
        ValueBody::Obj(obj) => object_path(obj, Overload::Neg, vec![a.clone()], ErrorCode::Neg),
        _ => err(ErrorCode::Neg),
    }
}

pub fn plus(a: &Value) -> DispatchOutcome {
    // Unary `+` is a no-op on numerics; object types may still overload it.
    if a.is_numeric() {
        return DispatchOutcome::Value(a.clone());
    }
    match a.body() {
        ValueBody::Obj(obj) => object_path(obj, Overload::Plus, vec![a.clone()], ErrorCode::Add),
        _ => err(ErrorCode::Add),
    }
}

pub fn invert(a: &Value) -> DispatchOutcome {
    match a.body() {
        ValueBody::Int(0) => err(ErrorCode::ONE_OVER_ZERO),
        ValueBody::Int(v) => {
            DispatchOutcome::Value(Value::num(Q::from_integer(Z::from_i64(*v)).inv().unwrap()))
        }
        ValueBody::Num(q) => match q.inv() {
            Some(inv) => DispatchOutcome::Value(Value::num(inv)),
            None => err(ErrorCode::ONE_OVER_ZERO),
        },
        ValueBody::Com(c) => match c.inv() {
            Some(inv) => DispatchOutcome::Value(Value::from_c(inv)),
            None => err(ErrorCode::ONE_OVER_ZERO),
        },
        ValueBody::Obj(obj) => object_path(obj, Overload::Inv, vec![a.clone()], ErrorCode::Inv),
        _ => err(ErrorCode::Inv),
    }
}

pub fn square(a: &Value) -> DispatchOutcome {
    match a.body() {
        ValueBody::Int(v) => DispatchOutcome::Value(Value::num(
            Q::from_integer(Z::from_i64(*v)).square(),
        )),
        ValueBody::Num(q) => DispatchOutcome::Value(Value::num(q.square())),
        ValueBody::Com(c) => DispatchOutcome::Value(Value::from_c(c.square())),
        ValueBody::Obj(obj) => object_path(obj, Overload::Square, vec![a.clone()], ErrorCode::Square),
        _ => err(ErrorCode::Square),
    }
}

pub fn abs(a: &Value, epsilon: &Q) -> DispatchOutcome {
    match a.body() {
        ValueBody::Int(v) => DispatchOutcome::Value(Value::num(Q::from_integer(Z::from_i64(v.abs())))),
        ValueBody::Num(q) => DispatchOutcome::Value(Value::num(q.abs())),
        ValueBody::Com(c) => match crate::kernel::transcendental::sqrt_q(&c.norm(), epsilon) {
            Some(root) => DispatchOutcome::Value(Value::num(root)),
            None => err(ErrorCode::Abs),
        },
        ValueBody::Obj(obj) => object_path(obj, Overload::Abs, vec![a.clone()], ErrorCode::Abs),
        _ => err(ErrorCode::Abs),
    }
}

pub fn norm(a: &Value) -> DispatchOutcome {
    match a.body() {
        ValueBody::Int(v) => DispatchOutcome::Value(Value::num(Q::from_integer(Z::from_i64(v * v)))),
        ValueBody::Num(q) => DispatchOutcome::Value(Value::num(q.square())),
        ValueBody::Com(c) => DispatchOutcome::Value(Value::num(c.norm())),
        _ => err(ErrorCode::Norm),
    }
}

pub fn conjugate(a: &Value) -> DispatchOutcome {
    match a.body() {
        ValueBody::Com(c) => DispatchOutcome::Value(Value::from_c(c.conj())),
        ValueBody::Int(_) | ValueBody::Num(_) => DispatchOutcome::Value(a.clone()),
        ValueBody::Obj(obj) => object_path(obj, Overload::Conj, vec![a.clone()], ErrorCode::Conj),
        _ => err(ErrorCode::Conj),
    }
}

pub fn re(a: &Value) -> DispatchOutcome {
    match a.body() {
        ValueBody::Com(c) => DispatchOutcome::Value(Value::num(c.real.clone())),
        ValueBody::Int(_) | ValueBody::Num(_) => DispatchOutcome::Value(a.clone()),
        _ => err(ErrorCode::Norm),
    }
}

pub fn im(a: &Value) -> DispatchOutcome {
    match a.body() {
        ValueBody::Com(c) => DispatchOutcome::Value(Value::num(c.imag.clone())),
        ValueBody::Int(_) | ValueBody::Num(_) => DispatchOutcome::Value(Value::num(Q::zero())),
        _ => err(ErrorCode::Norm),
    }
}

pub fn sgn(a: &Value) -> DispatchOutcome {
    match a.body() {
        ValueBody::Int(v) => DispatchOutcome::Value(Value::int(v.signum())),
        ValueBody::Num(q) => DispatchOutcome::Value(Value::int(q.sgn() as i64)),
        ValueBody::Obj(obj) => object_path(obj, Overload::Sgn, vec![a.clone()], ErrorCode::Sgn),
        _ => err(ErrorCode::Sgn),
    }
}

pub fn int_part(a: &Value) -> DispatchOutcome {
    match a.body() {
        ValueBody::Int(_) => DispatchOutcome::Value(a.clone()),
        ValueBody::Num(q) => DispatchOutcome::Value(Value::num(Q::from_integer(q.int_part()))),
        ValueBody::Obj(obj) => object_path(obj, Overload::Int, vec![a.clone()], ErrorCode::Int),
        _ => err(ErrorCode::Int),
    }
}

pub fn frac_part(a: &Value) -> DispatchOutcome {
    match a.body() {
        ValueBody::Int(_) => DispatchOutcome::Value(Value::num(Q::zero())),
        ValueBody::Num(q) => DispatchOutcome::Value(Value::num(q.frac_part())),
        ValueBody::Obj(obj) => object_path(obj, Overload::Frac, vec![a.clone()], ErrorCode::Frac),
        _ => err(ErrorCode::Frac),
    }
}

pub fn numerator(a: &Value) -> DispatchOutcome {
    match a.as_q() {
        Some(q) => DispatchOutcome::Value(Value::num(Q::from_integer(q.numerator()))),
        None => err(ErrorCode::Int),
    }
}

pub fn denominator(a: &Value) -> DispatchOutcome {
    match a.as_q() {
        Some(q) => DispatchOutcome::Value(Value::num(Q::from_integer(q.denominator()))),
        None => err(ErrorCode::Int),
    }
}

pub fn scale(a: &Value, exp: &Value) -> DispatchOutcome {
    if let Some(out) = propagate_error(a, exp) {
        return out;
    }
    let exp_i = match exp.as_int() {
        Some(v) => v,
        None => return err(ErrorCode::Scale2),
    };
    match a.body() {
        ValueBody::Int(v) => DispatchOutcome::Value(Value::num(
            Q::from_integer(Z::from_i64(*v)).scale(exp_i),
        )),
        ValueBody::Num(q) => DispatchOutcome::Value(Value::num(q.scale(exp_i))),
        ValueBody::Com(c) => DispatchOutcome::Value(Value::from_c(c.scale(exp_i))),
        ValueBody::Obj(obj) => object_path(obj, Overload::Scale, vec![a.clone(), exp.clone()], ErrorCode::Scale),
        _ => err(ErrorCode::Scale),
    }
}

pub fn left_shift(a: &Value, bits: &Value) -> DispatchOutcome {
    shift(a, bits, false)
}

pub fn right_shift(a: &Value, bits: &Value) -> DispatchOutcome {
    shift(a, bits, true)
}

fn shift(a: &Value, bits: &Value, right: bool) -> DispatchOutcome {
    if let Some(out) = propagate_error(a, bits) {
        return out;
    }
    let (v, n) = match (a.as_int(), bits.as_int()) {
        (Some(v), Some(n)) => (v, n),
        _ => return err(ErrorCode::Shift),
    };
    if n < 0 {
        return err(ErrorCode::Shift2);
    }
    let z = Z::from_i64(v);
    let shifted = if right { z.shr(n as u64) } else { z.shl(n as u64) };
    DispatchOutcome::Value(Value::num(Q::from_integer(shifted)))
}

pub fn bit(a: &Value, index: &Value) -> DispatchOutcome {
    match (a.as_int(), index.as_int()) {
        (Some(v), Some(i)) if i >= 0 => {
            DispatchOutcome::Value(Value::int(Z::from_i64(v).bit(i as u64) as i64))
        }
        _ => err(ErrorCode::Shift),
    }
}

pub fn highbit(a: &Value) -> DispatchOutcome {
    match a.as_int() {
        Some(v) => DispatchOutcome::Value(match Z::from_i64(v).highbit() {
            Some(b) => Value::int(b as i64),
            None => Value::int(-1),
        }),
        None => err(ErrorCode::Int),
    }
}

pub fn lowbit(a: &Value) -> DispatchOutcome {
    match a.as_int() {
        Some(v) => DispatchOutcome::Value(match Z::from_i64(v).lowbit() {
            Some(b) => Value::int(b as i64),
            None => Value::int(-1),
        }),
        None => err(ErrorCode::Int),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: i64, d: i64) -> Value {
        Value::num(Q::new(Z::from_i64(n), Z::from_i64(d)).unwrap())
    }

    #[test]
    fn add_promotes_int_and_num() {
        let out = add(&Value::int(2), &num(1, 2));
        match out {
            DispatchOutcome::Value(v) => assert_eq!(v.as_q(), num(5, 2).as_q()),
            _ => panic!("expected value"),
        }
    }

    #[test]
    fn div_by_zero_is_an_error_value() {
        let out = div(&Value::int(1), &Value::int(0));
        match out {
            DispatchOutcome::Value(v) => assert_eq!(v.as_error(), Some(ErrorCode::DivByZero)),
            _ => panic!("expected value"),
        }
    }

    #[test]
    fn zero_div_zero_is_distinguished() {
        let out = div(&Value::int(0), &Value::int(0));
        match out {
            DispatchOutcome::Value(v) => assert_eq!(v.as_error(), Some(ErrorCode::ZeroDivZero)),
            _ => panic!("expected value"),
        }
    }

    #[test]
    fn string_concatenation() {
        let a = Value::string(b"foo".to_vec());
        let b = Value::string(b"bar".to_vec());
        match add(&a, &b) {
            DispatchOutcome::Value(v) => match v.body() {
                ValueBody::Str(s) => assert_eq!(s.as_slice(), b"foobar"),
                _ => panic!("expected string"),
            },
            _ => panic!("expected value"),
        }
    }

    #[test]
    fn error_propagates_left_first() {
        let e1 = Value::error(ErrorCode::Add);
        let e2 = Value::error(ErrorCode::Sub);
        match add(&e1, &e2) {
            DispatchOutcome::Value(v) => assert_eq!(v.as_error(), Some(ErrorCode::Add)),
            _ => panic!("expected value"),
        }
    }

    fn obj_with(op: Overload, func_index: u32) -> Value {
        use crate::value::object::{Object, Schema};
        use std::rc::Rc;
        let mut schema = Schema::new("widget", vec![]);
        schema.bind(op, func_index);
        Value::new(ValueBody::Obj(Rc::new(Object::new(Rc::new(schema)))))
    }

    #[test]
    fn add_dispatches_to_a_right_hand_object_overload() {
        let obj = obj_with(Overload::Add, 7);
        match add(&Value::int(5), &obj) {
            DispatchOutcome::CallOverload { func_index, args } => {
                assert_eq!(func_index, 7);
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected overload call, got {other:?}"),
        }
    }

    #[test]
    fn mul_dispatches_to_a_right_hand_object_overload_when_left_is_unbound_numeric() {
        let obj = obj_with(Overload::Mul, 3);
        match mul(&Value::int(2), &obj) {
            DispatchOutcome::CallOverload { func_index, .. } => assert_eq!(func_index, 3),
            other => panic!("expected overload call, got {other:?}"),
        }
    }

    #[test]
    fn div_prefers_the_left_object_when_both_operands_are_objects() {
        let left = obj_with(Overload::Div, 1);
        let right = obj_with(Overload::Div, 2);
        match div(&left, &right) {
            DispatchOutcome::CallOverload { func_index, .. } => assert_eq!(func_index, 1),
            other => panic!("expected overload call, got {other:?}"),
        }
    }
}
