//! Pre/post increment and decrement dispatch (`spec.md` §4.2.3).
//!
//! Unlike the arithmetic opcodes, `++`/`--` operate on an addressable
//! slot directly (they both read the current value and write the
//! incremented one back), so dispatch here takes a [`Slot`] rather than
//! a bare [`Value`].

use crate::dispatch::arith;
use crate::dispatch::assign::assign;
use crate::dispatch::DispatchOutcome;
use crate::value::object::Overload;
use crate::value::{Slot, Value, ValueBody};
use calc_asm::ErrorCode;

fn step(v: &Value, delta: i64) -> DispatchOutcome {
    match v.body() {
        ValueBody::Obj(obj) => {
            let op = if delta > 0 { Overload::Inc } else { Overload::Dec };
            match obj.schema.lookup(op) {
                Some(func_index) => DispatchOutcome::CallOverload {
                    func_index,
                    args: vec![v.clone()],
                },
                None => DispatchOutcome::Value(Value::error(if delta > 0 {
                    ErrorCode::IncV
                } else {
                    ErrorCode::DecV
                })),
            }
        }
        _ => {
            let one = Value::int(delta.signum());
            arith::add(v, &one)
        }
    }
}

/// Pre-increment/decrement: write the stepped value, return it.
pub fn pre_step(dest: &Slot, delta: i64) -> DispatchOutcome {
    let current = dest.borrow().clone();
    match step(&current, delta) {
        DispatchOutcome::Value(new_value) => DispatchOutcome::Value(assign(dest, new_value)),
        call => call,
    }
}

/// Post-increment/decrement: write the stepped value, return the value
/// that was there *before* the step.
pub fn post_step(dest: &Slot, delta: i64) -> DispatchOutcome {
    let current = dest.borrow().clone();
    match step(&current, delta) {
        DispatchOutcome::Value(new_value) => {
            assign(dest, new_value);
            DispatchOutcome::Value(current)
        }
        call => call,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::new_slot;

    #[test]
    fn pre_increment_returns_the_new_value() {
        let slot = new_slot(Value::int(4));
        let out = pre_step(&slot, 1);
        match out {
            DispatchOutcome::Value(v) => assert_eq!(v.as_int(), Some(5)),
            _ => panic!("expected value"),
        }
        assert_eq!(slot.borrow().as_int(), Some(5));
    }

    #[test]
    fn post_decrement_returns_the_old_value() {
        let slot = new_slot(Value::int(4));
        let out = post_step(&slot, -1);
        match out {
            DispatchOutcome::Value(v) => assert_eq!(v.as_int(), Some(4)),
            _ => panic!("expected value"),
        }
        assert_eq!(slot.borrow().as_int(), Some(3));
    }
}
