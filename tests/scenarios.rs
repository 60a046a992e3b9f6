//! End-to-end scenarios for the dispatch/interpreter pipeline, built by
//! hand-assembling `calc_asm::Opcode` streams the way a compiler front end
//! would, rather than going through one (there is no parser in this crate).

use calc_asm::{CompiledFunction, ConstNumber, ConstantTable, Opcode::*};
use calc_vm::error::InterpreterError;
use calc_vm::kernel::Q;
use calc_vm::value::{Value, ValueBody};
use calc_vm::Interpreter;

fn run(function: CompiledFunction, args: Vec<Value>) -> Result<Value, InterpreterError> {
    let mut interp = Interpreter::new(vec![function], 0);
    interp.call(0, args)
}

/// S1: a local initialized to `1`, read twice and added to itself.
#[test]
fn s1_local_self_sum() {
    let f = CompiledFunction::new(
        "s1",
        0,
        false,
        1,
        ConstantTable::new(),
        &[LocalAddr(0), One, AssignPop, LocalValue(0), LocalValue(0), Add, Return],
    );
    let result = run(f, vec![]).expect("s1 runs to completion");
    assert_eq!(result.as_int(), Some(2));
}

/// S2: factorial by recursion, one parameter, no locals.
#[test]
fn s2_recursive_factorial() {
    let f = CompiledFunction::new(
        "fact",
        1,
        false,
        0,
        ConstantTable::new(),
        &[
            // if n <= 1: return 1
            One,
            ParamValue(0),
            Le,
            JumpZ(8),
            One,
            Return,
            // else: return n * fact(n - 1)
            ParamValue(0),
            ParamValue(0),
            One,
            Sub,
            UserCall { func: 0, arg_count: 1 },
            Mul,
            Return,
        ],
    );
    let result = run(f, vec![Value::int(5)]).expect("fact(5) runs to completion");
    assert_eq!(result.as_int(), Some(120));
}

/// S3: exact rational addition, `1/3 + 2/3` reduces to `1`.
#[test]
fn s3_rational_addition_reduces() {
    let mut constants = ConstantTable::new();
    let one_third = constants.intern_number(ConstNumber {
        numerator: "1".to_string(),
        denominator: "3".to_string(),
        imag_numerator: None,
        imag_denominator: None,
    });
    let two_thirds = constants.intern_number(ConstNumber {
        numerator: "2".to_string(),
        denominator: "3".to_string(),
        imag_numerator: None,
        imag_denominator: None,
    });
    let f = CompiledFunction::new(
        "s3",
        0,
        false,
        0,
        constants,
        &[Number(one_third), Number(two_thirds), Add, Return],
    );
    let result = run(f, vec![]).expect("s3 runs to completion");
    match result.body() {
        ValueBody::Int(n) => assert_eq!(*n, 1),
        ValueBody::Num(q) => assert_eq!(*q, Q::from_integer(calc_vm::kernel::Z::from_i64(1))),
        other => panic!("expected a reduced 1, got {other:?}"),
    }
}

/// S4: building a 2x2 matrix element by element and squaring it.
#[test]
fn s4_matrix_squared() {
    let mut constants = ConstantTable::new();
    let two = constants.intern_number(ConstNumber::integer("2"));
    let three = constants.intern_number(ConstNumber::integer("3"));
    let four = constants.intern_number(ConstNumber::integer("4"));
    let f = CompiledFunction::new(
        "s4",
        0,
        false,
        0,
        constants,
        &[
            Zero,
            One,
            Zero,
            One,
            MatCreate(2),
            One,
            ElemInit(0),
            Number(two),
            ElemInit(1),
            Number(three),
            ElemInit(2),
            Number(four),
            ElemInit(3),
            Duplicate,
            Mul,
            Return,
        ],
    );
    let result = run(f, vec![]).expect("s4 runs to completion");
    match result.body() {
        ValueBody::Mat(m) => {
            let values: Vec<String> = m.elements().iter().map(|slot| as_q(&slot.borrow()).to_string()).collect();
            assert_eq!(values, vec!["7", "10", "15", "22"]);
        }
        other => panic!("expected a matrix, got {other:?}"),
    }
}

fn as_q(v: &Value) -> Q {
    v.as_q().expect("numeric value")
}

/// S5: `1 / 0` folds into a typed Error value rather than panicking or
/// halting the interpreter.
#[test]
fn s5_division_by_zero_is_an_error_value() {
    let f = CompiledFunction::new("s5", 0, false, 0, ConstantTable::new(), &[One, Zero, Div, Return]);
    let result = run(f, vec![]).expect("s5 runs to completion");
    assert_eq!(result.as_error(), Some(calc_asm::ErrorCode::DivByZero));
}

/// S6: `2^100`, exercising the arbitrary-precision integer path.
#[test]
fn s6_large_power() {
    let mut constants = ConstantTable::new();
    let two = constants.intern_number(ConstNumber::integer("2"));
    let hundred = constants.intern_number(ConstNumber::integer("100"));
    let f = CompiledFunction::new("s6", 0, false, 0, constants, &[Number(two), Number(hundred), Power, Return]);
    let result = run(f, vec![]).expect("s6 runs to completion");
    let expected = "1267650600228229401496703205376";
    match result.body() {
        ValueBody::Int(n) => assert_eq!(n.to_string(), expected),
        ValueBody::Num(q) => assert_eq!(q.to_string(), expected),
        other => panic!("expected an integer result, got {other:?}"),
    }
}
