//! Matrix/List container arithmetic, the "shape rules for containers"
//! `spec.md` §4.2 lists alongside its seven-path scalar dispatch rule.
//!
//! Every element-wise op here works on plain `Value`s, not addresses: a
//! container holding an `Obj` whose schema binds the relevant overload
//! would need to suspend mid-matrix and resume through the interpreter's
//! continuation machinery (`interpreter::Continuation`), which this pure
//! dispatch layer has no way to do. Such an element is reported as an
//! unbound-overload Error instead of silently skipped — see DESIGN.md.

use crate::dispatch::DispatchOutcome;
use crate::value::matrix::{Bound, Matrix};
use crate::value::{Value, ValueBody};
use calc_asm::ErrorCode;

fn elementwise(a: &Matrix, b: &Matrix, op: impl Fn(&Value, &Value) -> DispatchOutcome) -> Result<Matrix, Value> {
    let mut out = Matrix::new(a.bounds().to_vec());
    for (i, (sa, sb)) in a.elements().iter().zip(b.elements().iter()).enumerate() {
        let va = sa.borrow().clone();
        let vb = sb.borrow().clone();
        match op(&va, &vb) {
            DispatchOutcome::Value(v) => {
                if let Some(code) = v.as_error() {
                    return Err(Value::error(code));
                }
                *out.slot_at_position(i).expect("same shape as `a`").borrow_mut() = v;
            }
            DispatchOutcome::CallOverload { .. } => return Err(Value::error(ErrorCode::Add)),
        }
    }
    Ok(out)
}

fn same_shape(a: &Matrix, b: &Matrix) -> bool {
    a.rank() == b.rank() && a.bounds().iter().zip(b.bounds().iter()).all(|(x, y)| x.span() == y.span())
}

/// `Matrix + Matrix`: identical rank and per-axis span required; the
/// result's bounds follow whichever operand has a non-zero-origin axis
/// (`spec.md` §4.2's "inherits max-index origin" rule), defaulting to `a`.
pub fn add(a: &Matrix, b: &Matrix) -> DispatchOutcome {
    if !same_shape(a, b) {
        return DispatchOutcome::Value(Value::error(ErrorCode::Add));
    }
    let bounds: Vec<Bound> = a
        .bounds()
        .iter()
        .zip(b.bounds().iter())
        .map(|(x, y)| if x.min != 0 { *x } else { *y })
        .collect();
    let mut out = Matrix::new(bounds);
    for (i, (sa, sb)) in a.elements().iter().zip(b.elements().iter()).enumerate() {
        let va = sa.borrow().clone();
        let vb = sb.borrow().clone();
        match super::arith::add(&va, &vb) {
            DispatchOutcome::Value(v) => {
                if let Some(code) = v.as_error() {
                    return DispatchOutcome::Value(Value::error(code));
                }
                *out.slot_at_position(i).expect("same shape as `a`").borrow_mut() = v;
            }
            DispatchOutcome::CallOverload { .. } => return DispatchOutcome::Value(Value::error(ErrorCode::Add)),
        }
    }
    DispatchOutcome::Value(Value::new(ValueBody::Mat(std::rc::Rc::new(out))))
}

/// `Matrix · Matrix`/`scalar · Matrix`/`Matrix · scalar` per `spec.md`
/// §4.2's shape rules: scalar times matrix (rank 0), Hadamard product
/// (matching rank-1 spans), or row-by-column multiplication (rank 2,
/// inner span match).
pub fn mul(a: &Value, b: &Value) -> Option<DispatchOutcome> {
    match (a.body(), b.body()) {
        (ValueBody::Mat(m), _) if b.is_numeric() => Some(scale_matrix(m, b)),
        (_, ValueBody::Mat(m)) if a.is_numeric() => Some(scale_matrix(m, a)),
        (ValueBody::Mat(ma), ValueBody::Mat(mb)) => Some(mat_mul(ma, mb)),
        _ => None,
    }
}

fn scale_matrix(m: &Matrix, scalar: &Value) -> DispatchOutcome {
    let mut out = Matrix::new(m.bounds().to_vec());
    for (i, slot) in m.elements().iter().enumerate() {
        let v = slot.borrow().clone();
        match super::arith::mul(&v, scalar) {
            DispatchOutcome::Value(r) => {
                if let Some(code) = r.as_error() {
                    return DispatchOutcome::Value(Value::error(code));
                }
                *out.slot_at_position(i).unwrap().borrow_mut() = r;
            }
            DispatchOutcome::CallOverload { .. } => return DispatchOutcome::Value(Value::error(ErrorCode::Mul)),
        }
    }
    DispatchOutcome::Value(Value::new(ValueBody::Mat(std::rc::Rc::new(out))))
}

fn mat_mul(a: &Matrix, b: &Matrix) -> DispatchOutcome {
    if a.rank() == 1 && b.rank() == 1 {
        if a.bounds()[0].span() != b.bounds()[0].span() {
            return DispatchOutcome::Value(Value::error(ErrorCode::Mul));
        }
        return match elementwise(a, b, super::arith::mul) {
            Ok(result) => DispatchOutcome::Value(Value::new(ValueBody::Mat(std::rc::Rc::new(result)))),
            Err(error_value) => DispatchOutcome::Value(error_value),
        };
    }
    if a.rank() != 2 || b.rank() != 2 {
        return DispatchOutcome::Value(Value::error(ErrorCode::Mul));
    }
    let (a_rows, a_cols) = (a.bounds()[0], a.bounds()[1]);
    let (b_rows, b_cols) = (b.bounds()[0], b.bounds()[1]);
    if a_cols.span() != b_rows.span() {
        return DispatchOutcome::Value(Value::error(ErrorCode::Mul));
    }
    let out_bounds = vec![a_rows, b_cols];
    let mut out = Matrix::new(out_bounds);
    for r in 0..a_rows.span() {
        for c in 0..b_cols.span() {
            let mut sum = Value::int(0);
            for k in 0..a_cols.span() {
                let av = a
                    .slot_at(&[a_rows.min + r, a_cols.min + k])
                    .expect("indices within bounds")
                    .borrow()
                    .clone();
                let bv = b
                    .slot_at(&[b_rows.min + k, b_cols.min + c])
                    .expect("indices within bounds")
                    .borrow()
                    .clone();
                let product = match super::arith::mul(&av, &bv) {
                    DispatchOutcome::Value(v) => v,
                    DispatchOutcome::CallOverload { .. } => return DispatchOutcome::Value(Value::error(ErrorCode::Mul)),
                };
                if let Some(code) = product.as_error() {
                    return DispatchOutcome::Value(Value::error(code));
                }
                sum = match super::arith::add(&sum, &product) {
                    DispatchOutcome::Value(v) => v,
                    DispatchOutcome::CallOverload { .. } => return DispatchOutcome::Value(Value::error(ErrorCode::Add)),
                };
            }
            let dst = out.offset(&[a_rows.min + r, b_cols.min + c]).expect("within bounds");
            *out.slot_at_position(dst).unwrap().borrow_mut() = sum;
        }
    }
    DispatchOutcome::Value(Value::new(ValueBody::Mat(std::rc::Rc::new(out))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_matrix(rows: i64, cols: i64, values: &[i64]) -> Matrix {
        let m = Matrix::new(vec![Bound { min: 0, max: rows - 1 }, Bound { min: 0, max: cols - 1 }]);
        for (slot, v) in m.elements().iter().zip(values.iter()) {
            *slot.borrow_mut() = Value::int(*v);
        }
        m
    }

    fn read(m: &Matrix) -> Vec<i64> {
        m.elements().iter().map(|s| s.borrow().as_int().unwrap()).collect()
    }

    #[test]
    fn two_by_two_matrix_multiplication_matches_the_textbook_product() {
        let a = square_matrix(2, 2, &[1, 2, 3, 4]);
        match mat_mul(&a, &a) {
            DispatchOutcome::Value(v) => match v.body() {
                ValueBody::Mat(m) => assert_eq!(read(m), vec![7, 10, 15, 22]),
                _ => panic!("expected matrix"),
            },
            DispatchOutcome::CallOverload { .. } => panic!("expected value"),
        }
    }

    #[test]
    fn mismatched_inner_span_is_an_error() {
        let a = Matrix::new(vec![Bound { min: 0, max: 1 }, Bound { min: 0, max: 2 }]);
        let b = Matrix::new(vec![Bound { min: 0, max: 0 }, Bound { min: 0, max: 1 }]);
        match mat_mul(&a, &b) {
            DispatchOutcome::Value(v) => assert_eq!(v.as_error(), Some(ErrorCode::Mul)),
            DispatchOutcome::CallOverload { .. } => panic!("expected value"),
        }
    }
}
