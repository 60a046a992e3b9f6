//! Opcode vocabulary, instruction encoding, and the error/fault vocabulary
//! shared between a compiled calc function and the `calc-vm` interpreter
//! that executes it. This crate owns the wire format the engine consumes
//! and nothing about how the engine evaluates it.

mod class;
mod config_key;
mod encoding;
mod error_code;
mod fault;
mod function;
mod opcode;

pub use class::OperandClass;
pub use config_key::ConfigKey;
pub use encoding::{decode, decode_one, encode, DecodeError};
pub use error_code::ErrorCode;
pub use fault::EngineFault;
pub use function::{ConstNumber, ConstantTable, CompiledFunction};
pub use opcode::{ConstRef, GlobalRef, Opcode};

/// Machine word of the compiled instruction stream. Every opcode and every
/// immediate occupies one `Word`.
pub type Word = i64;
