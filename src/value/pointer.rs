//! Typed non-owning pointer arms (`spec.md` §4.2.7) and named blocks.

use crate::kernel::Q;
use crate::value::Slot;
use std::cell::RefCell;
use std::rc::Rc;

/// A mutable resizable byte block, as pointed to by [`Pointer::OPtr`] or
/// held directly by `Value::Block`/`Value::NBlock`.
pub type BlockData = Rc<RefCell<Vec<u8>>>;

/// One byte inside a [`BlockData`]. `spec.md` §4.2.7 also allows an Octet
/// into a Str; this implementation's `Str` arm is an immutable
/// `Rc<Vec<u8>>`, so taking an Octet of a Str is routed through the value
/// layer's copy-on-write instead (see `dispatch::index`), which promotes
/// that string's bytes into a fresh owned [`BlockData`] first.
#[derive(Debug, Clone)]
pub struct Octet {
    pub data: BlockData,
    pub index: usize,
}

/// A named, globally-registered block (`Value::NBlock`).
#[derive(Debug, Clone)]
pub struct NamedBlock {
    pub name: String,
    pub data: BlockData,
}

/// Typed pointer produced by applying [`calc_asm::Opcode::Ptr`] to an
/// lvalue: dereferencing yields the tag the pointer names.
#[derive(Debug, Clone)]
pub enum Pointer {
    /// Points to a Value cell.
    VPtr(Slot),
    /// Points to a byte inside a block.
    OPtr(Octet),
    /// Points to a string handle.
    SPtr(Rc<Vec<u8>>),
    /// Points to a rational-number handle.
    NPtr(Rc<Q>),
}

impl Pointer {
    /// Advance the pointer by `delta` elements/bytes, per `spec.md`
    /// §4.2.7 ("pointer arithmetic is only defined within Block for OPtr
    /// and on contiguous arrays for VPtr"). Returns `None` if arithmetic
    /// is not defined for this pointer kind.
    pub fn advance(&self, delta: i64) -> Option<Pointer> {
        match self {
            Pointer::OPtr(o) => {
                let new_index = o.index as i64 + delta;
                if new_index < 0 {
                    return None;
                }
                Some(Pointer::OPtr(Octet {
                    data: o.data.clone(),
                    index: new_index as usize,
                }))
            }
            _ => None,
        }
    }
}
