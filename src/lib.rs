//! Evaluation core of an arbitrary-precision rational calculator: numeric
//! kernel, value layer, operand-tag dispatch and the stack VM that drives
//! a compiled [`calc_asm::CompiledFunction`] to completion.
//!
//! This crate owns *evaluation*, not compilation. Turning calc source
//! text into a [`calc_asm::CompiledFunction`] stream is a separate
//! concern, out of this workspace's scope.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod consts;
pub mod dispatch;
pub mod error;
pub mod interpreter;
pub mod kernel;
pub mod state;
pub mod value;

#[doc(no_inline)]
pub use calc_asm;

pub use error::{InterpreterError, RuntimeError};
pub use interpreter::Interpreter;
pub use state::{ExecuteState, ProgramState};
