//! Equality, ordering and type-acceptance dispatch (`spec.md` §4.2.1).

use crate::dispatch::DispatchOutcome;
use crate::value::object::Overload;
use crate::value::{Value, ValueBody, ValueTag};
use calc_asm::ErrorCode;
use std::cmp::Ordering;

fn err(code: ErrorCode) -> DispatchOutcome {
    DispatchOutcome::Value(Value::error(code))
}

fn object_path(obj: &crate::value::Object, op: Overload, args: Vec<Value>, unbound: ErrorCode) -> DispatchOutcome {
    match obj.schema.lookup(op) {
        Some(func_index) => DispatchOutcome::CallOverload { func_index, args },
        None => err(unbound),
    }
}

/// The operand carrying the object/overload schema: either side may be
/// `Obj` (`spec.md` §4.2 path 5); the left operand's schema wins when
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

/// Structural `==`, usable directly (no overload dispatch: real calc's
/// `==` always falls back to the built-in comparison, `spec.md` §4.2.1).
pub fn equal(a: &Value, b: &Value) -> bool {
    a == b
}

pub fn not_equal(a: &Value, b: &Value) -> bool {
    !equal(a, b)
}

/// Three-way compare for the ordering relationals (`<`, `<=`, `>`, `>=`).
/// Numerics compare by value; strings lexicographically by byte; other
/// tags have no defined order unless the operand is an Object that
/// overloads [`Overload::Rel`].
pub fn compare(a: &Value, b: &Value) -> DispatchOutcome {
    if let Some(code) = a.as_error() {
        return DispatchOutcome::Value(Value::error(code));
    }
    if let Some(code) = b.as_error() {
        return DispatchOutcome::Value(Value::error(code));
    }
    if let (Some(qa), Some(qb)) = (a.as_q(), b.as_q()) {
        return DispatchOutcome::Value(Value::int(qa.cmp_signed(&qb) as i64));
    }
    if let (ValueBody::Str(x), ValueBody::Str(y)) = (a.body(), b.body()) {
        return DispatchOutcome::Value(Value::int(match x.as_slice().cmp(y.as_slice()) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }));
    }
    if let Some(obj) = obj_operand(a, b) {
        return object_path(obj, Overload::Rel, vec![a.clone(), b.clone()], ErrorCode::Cmp);
    }
    err(ErrorCode::Cmp)
}

/// Comparison used by the `cmp()` builtin: like [`compare`] but also
/// covers Com operands (norm order) and falls back to [`Overload::Cmp`]
/// rather than [`Overload::Rel`] for objects, per `spec.md` §4.2.1's
/// distinction between the two overload hooks.
pub fn cmp(a: &Value, b: &Value) -> DispatchOutcome {
    if let (Some(ca), Some(cb)) = (a.as_c(), b.as_c()) {
        if !ca.is_real() || !cb.is_real() {
            let na = ca.norm();
            let nb = cb.norm();
            return DispatchOutcome::Value(Value::int(na.cmp_signed(&nb) as i64));
        }
    }
    if let Some(obj) = obj_operand(a, b) {
        return object_path(obj, Overload::Cmp, vec![a.clone(), b.clone()], ErrorCode::Cmp);
    }
    compare(a, b)
}

/// Whether a write of `incoming` into a slot currently holding `existing`
/// is consistent with `existing`'s protection subtype (`spec.md` §3.2's
/// `NO_NEW_TYPE`/`NO_NEW_VALUE` bits). Pure predicate; raising the actual
/// `E_NOTASSIGNABLE` error is `dispatch::assign`'s job.
pub fn accepts(existing: &Value, incoming: &Value) -> bool {
    use crate::value::Subtype;
    if existing.subtype().contains(Subtype::NO_NEW_TYPE) && existing.tag() != incoming.tag() {
        return false;
    }
    if existing.subtype().contains(Subtype::NO_NEW_VALUE) && existing != incoming {
        return false;
    }
    if existing.subtype().contains(Subtype::NO_ERROR) && matches!(incoming.body(), ValueBody::Error(_)) {
        return false;
    }
    true
}

pub fn same_tag(a: &Value, b: &Value) -> bool {
    a.tag() == b.tag()
}

/// Whether `tag` is one of the purely numeric tags, used by `isreal`,
/// `iscomplex` and friends.
pub fn is_tag(v: &Value, tag: ValueTag) -> bool {
    v.tag() == tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{Q, Z};

    fn num(n: i64, d: i64) -> Value {
        Value::num(Q::new(Z::from_i64(n), Z::from_i64(d)).unwrap())
    }

    #[test]
    fn equal_numerics_compare_across_tags() {
        assert!(equal(&Value::int(2), &num(4, 2)));
    }

    #[test]
    fn compare_orders_strings_lexicographically() {
        let a = Value::string(b"abc".to_vec());
        let b = Value::string(b"abd".to_vec());
        match compare(&a, &b) {
            DispatchOutcome::Value(v) => assert_eq!(v.as_int(), Some(-1)),
            _ => panic!("expected value"),
        }
    }

    #[test]
    fn no_new_type_rejects_a_tag_change() {
        use crate::value::Subtype;
        let existing = Value::with_subtype(crate::value::ValueBody::Int(1), Subtype::NO_NEW_TYPE);
        assert!(!accepts(&existing, &num(1, 1)));
        assert!(accepts(&existing, &Value::int(2)));
    }

    fn obj_with(op: Overload, func_index: u32) -> Value {
        use crate::value::object::{Object, Schema};
        use std::rc::Rc;
        let mut schema = Schema::new("widget", vec![]);
        schema.bind(op, func_index);
        Value::new(ValueBody::Obj(Rc::new(Object::new(Rc::new(schema)))))
    }

    #[test]
    fn compare_dispatches_to_a_right_hand_object_overload() {
        let obj = obj_with(Overload::Rel, 9);
        match compare(&Value::int(1), &obj) {
            DispatchOutcome::CallOverload { func_index, .. } => assert_eq!(func_index, 9),
            other => panic!("expected overload call, got {other:?}"),
        }
    }

    #[test]
    fn cmp_dispatches_to_a_right_hand_object_overload() {
        let obj = obj_with(Overload::Cmp, 4);
        match cmp(&Value::int(1), &obj) {
            DispatchOutcome::CallOverload { func_index, .. } => assert_eq!(func_index, 4),
            other => panic!("expected overload call, got {other:?}"),
        }
    }
}
