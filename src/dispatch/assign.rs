//! Assignment dispatch (`spec.md` §4.2.2): `assign`, `assign_pop` and
//! `assign_back`, each checking the destination's protection subtype
//! before writing through.

use crate::dispatch::relation::accepts;
use crate::value::subtype::Subtype;
use crate::value::{Slot, Value, ValueBody};
use calc_asm::ErrorCode;

/// Write `value` into `*dest`, unioning subtype flags per `spec.md` §3.2
/// ("assignment merges source and destination protection bits") and
/// refusing the write if `dest`'s current value or `value` itself forbids
/// it.
///
/// Dereferences `value` first if it is itself an [`ValueBody::Addr`]
/// (`spec.md` §4.2.2: "dereferences src if it is Addr"), so `a = &b`
/// stores `b`'s value rather than the address value.
///
/// Returns the value that ends up in the slot (useful to callers that
/// need a copy without re-borrowing), or an Error Value if the write was
/// refused.
pub fn assign(dest: &Slot, value: Value) -> Value {
    let value = match value.body() {
        ValueBody::Addr(slot) => slot.borrow().clone(),
        _ => value,
    };
    {
        let current = dest.borrow();
        if current.subtype().contains(Subtype::NO_ASSIGN_TO) || current.subtype().contains(Subtype::PROTECT_ALL) {
            return Value::error(ErrorCode::NotAssignable);
        }
        if value.subtype().contains(Subtype::NO_ASSIGN_FROM) {
            return Value::error(ErrorCode::NotAssignable);
        }
        if !accepts(&current, &value) {
            return Value::error(ErrorCode::NotAssignable);
        }
    }
    let merged_subtype = dest.borrow().subtype().merge(value.subtype());
    let mut written = value;
    *written.subtype_mut() = merged_subtype;
    *dest.borrow_mut() = written.clone();
    written
}

/// `assign` followed by discarding the destination (used by the `=`
/// statement form that doesn't push the assigned value back onto the
/// stack, vs. the `a = b` expression form that does via [`assign`]).
pub fn assign_pop(dest: &Slot, value: Value) {
    let _ = assign(dest, value);
}

/// Read-modify-write: apply `f` to the current value and store the
/// result, used by the compound-assignment opcodes (`+=`, `-=`, ...).
/// Returns the new value (post-update), matching calc's "compound
/// assignment yields the updated value" semantics.
pub fn assign_back(dest: &Slot, f: impl FnOnce(&Value) -> Value) -> Value {
    let updated = {
        let current = dest.borrow();
        f(&current)
    };
    assign(dest, updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::new_slot;

    #[test]
    fn assign_writes_through_an_unprotected_slot() {
        let slot = new_slot(Value::int(1));
        let result = assign(&slot, Value::int(2));
        assert_eq!(result.as_int(), Some(2));
        assert_eq!(slot.borrow().as_int(), Some(2));
    }

    #[test]
    fn no_assign_to_refuses_the_write() {
        let slot = new_slot(Value::with_subtype(
            crate::value::ValueBody::Int(1),
            Subtype::NO_ASSIGN_TO,
        ));
        let result = assign(&slot, Value::int(2));
        assert_eq!(result.as_error(), Some(ErrorCode::NotAssignable));
        assert_eq!(slot.borrow().as_int(), Some(1));
    }

    #[test]
    fn assign_back_applies_the_update_function() {
        let slot = new_slot(Value::int(5));
        let result = assign_back(&slot, |v| Value::int(v.as_int().unwrap() + 1));
        assert_eq!(result.as_int(), Some(6));
        assert_eq!(slot.borrow().as_int(), Some(6));
    }

    #[test]
    fn no_assign_from_refuses_the_write() {
        let slot = new_slot(Value::int(1));
        let protected_source =
            Value::with_subtype(crate::value::ValueBody::Int(2), Subtype::NO_ASSIGN_FROM);
        let result = assign(&slot, protected_source);
        assert_eq!(result.as_error(), Some(ErrorCode::NotAssignable));
        assert_eq!(slot.borrow().as_int(), Some(1));
    }

    #[test]
    fn protect_all_refuses_the_write_like_no_assign_to() {
        let slot = new_slot(Value::with_subtype(crate::value::ValueBody::Int(1), Subtype::PROTECT_ALL));
        let result = assign(&slot, Value::int(2));
        assert_eq!(result.as_error(), Some(ErrorCode::NotAssignable));
        assert_eq!(slot.borrow().as_int(), Some(1));
    }

    #[test]
    fn assign_dereferences_an_addr_source() {
        let source = new_slot(Value::int(42));
        let dest = new_slot(Value::int(0));
        let result = assign(&dest, Value::new(crate::value::ValueBody::Addr(source)));
        assert_eq!(result.as_int(), Some(42));
        assert_eq!(dest.borrow().as_int(), Some(42));
        assert!(!matches!(dest.borrow().body(), crate::value::ValueBody::Addr(_)));
    }
}
