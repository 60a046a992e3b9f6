/// Operand-shape classification for an [`crate::Opcode`].
///
/// Every compiled function is a flat array of machine words: one word for
/// the opcode itself, followed by zero or more immediate words whose count
/// and meaning is fixed by the opcode's class. This mirrors how the
/// instruction stream is actually laid out in [`crate::function::CompiledFunction`];
/// [`crate::Opcode::class`] is the single source of truth other tooling
/// (debuggers, disassemblers) can use instead of re-deriving it from the
/// variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum OperandClass {
    /// No immediates.
    Nul,
    /// One integer immediate.
    One,
    /// Two integer immediates.
    Two,
    /// One integer immediate: an absolute index into the current function's
    /// opcode vector.
    Jmp,
    /// One immediate: a global symbol reference.
    Glb,
    /// One integer immediate: a local-variable index.
    Loc,
    /// One integer immediate: a parameter index.
    Par,
    /// No immediates; the operand count is read from the current frame.
    Arg,
    /// No immediates; terminates the current function.
    Ret,
    /// One integer immediate: a static-initializer guard id.
    Sti,
}

impl OperandClass {
    /// Number of trailing immediate words this class consumes from the
    /// instruction stream, for classes with a fixed width. `Two` is the
    /// only two-word class; `Nul`, `Arg` and `Ret` consume none.
    pub const fn immediate_words(self) -> usize {
        match self {
            OperandClass::Nul | OperandClass::Arg | OperandClass::Ret => 0,
            OperandClass::One
            | OperandClass::Jmp
            | OperandClass::Glb
            | OperandClass::Loc
            | OperandClass::Par
            | OperandClass::Sti => 1,
            OperandClass::Two => 2,
        }
    }
}
