//! One activation record on the interpreter's call stack.

use crate::value::{new_slot, Slot, Value};

/// Locals and actual arguments for one function invocation.
#[derive(Debug)]
pub struct Frame {
    /// The function index this frame is executing (`calc_asm::CompiledFunction`
    /// index into [`crate::interpreter::Interpreter::functions`]).
    pub func_index: u32,
    /// Program counter: a word offset into the function's encoded stream.
    pub pc: usize,
    /// Local variable slots, sized to the function's declared local count.
    pub locals: Vec<Slot>,
    /// Actual argument slots, in call order (`spec.md` §4.3.4: param
    /// access and `ArgValue`-by-index both read from here). Slots rather
    /// than bare values so `ParamAddr` is addressable the same way
    /// `LocalAddr` is.
    pub args: Vec<Slot>,
    /// Operand-stack height when this frame was entered, so `Return` knows
    /// how much of the shared stack belongs to the callee.
    pub stack_base: usize,
}

impl Frame {
    pub fn new(func_index: u32, local_count: usize, args: Vec<Value>) -> Self {
        Frame {
            func_index,
            pc: 0,
            locals: (0..local_count).map(|_| new_slot(Value::null())).collect(),
            args: args.into_iter().map(new_slot).collect(),
            stack_base: 0,
        }
    }
}
