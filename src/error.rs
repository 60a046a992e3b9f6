//! Runtime error types.
//!
//! Splits `InterpreterError` (what a caller of
//! [`crate::interpreter::Interpreter::run`] sees) from `RuntimeError`
//! (recoverable-vs-halt, internal to the dispatch loop):
//! `RuntimeError::Recoverable` carries a [`calc_asm::ErrorCode`] — a
//! typed Error value the dispatch loop can fold back into the operand
//! stack — while `RuntimeError::Halt` carries an [`calc_asm::EngineFault`]
//! for conditions nothing in calc's language can catch or continue past.

use calc_asm::{EngineFault, ErrorCode};
use thiserror::Error;

/// Top-level error returned by [`crate::interpreter::Interpreter::run`] and
/// [`crate::interpreter::Interpreter::call`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InterpreterError {
    /// Execution halted on an [`EngineFault`]; the interpreter is no
    /// longer usable and should be reset before the next call.
    #[error("interpreter halted: {0}")]
    Halted(#[from] EngineFault),
    /// No such user function index, raised by `USERCALL`.
    #[error("no user function at index {0}")]
    NoSuchFunction(u32),
    /// No such builtin index, raised by `CALL`.
    #[error("no such builtin at index {0}")]
    NoSuchBuiltin(u32),
}

/// Internal result of a single opcode or kernel dispatch: either the
/// operation completed (possibly producing an [`ErrorCode`] *value*, which
/// is not a Rust-level error — see `spec.md` §4.3.3), or it must halt the
/// VM outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A condition a calc program can observe and recover from: the
    /// interpreter pushes an Error value and keeps running.
    Recoverable(ErrorCode),
    /// A condition that must halt the interpreter.
    Halt(EngineFault),
}

impl RuntimeError {
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable(_))
    }

    pub const fn must_halt(&self) -> bool {
        matches!(self, Self::Halt(_))
    }
}

impl From<EngineFault> for RuntimeError {
    fn from(fault: EngineFault) -> Self {
        RuntimeError::Halt(fault)
    }
}

impl From<ErrorCode> for RuntimeError {
    fn from(code: ErrorCode) -> Self {
        RuntimeError::Recoverable(code)
    }
}
