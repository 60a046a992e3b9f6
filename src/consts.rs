//! Engine-wide size limits.

/// Recommended fixed operand-stack depth (`spec.md` §5: "fixed-depth,
/// implementation chooses, recommended ~1000 cells").
pub const VM_STACK_DEPTH: usize = 1000;

/// Default maximum `USERCALL` nesting before a stack-overflow fault.
pub const VM_MAX_CALL_DEPTH: u32 = 1000;

/// Maximum matrix rank (`spec.md` §3.3: "N ≤ 4").
pub const MATRIX_MAX_RANK: usize = 4;

/// First 16 elements, then a stride sample, of a container's quick hash
/// (`spec.md` §4.2.6).
pub const QUICKHASH_HEAD_ELEMENTS: usize = 16;

/// Default cooperative-abort threshold, in abort-signal levels, before
/// the engine raises a fatal at the next `DEBUG` checkpoint.
pub const DEFAULT_ABORT_THRESHOLD: u32 = 1;
