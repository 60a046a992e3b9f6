//! The polymorphic tagged value `spec.md` §3.2 describes.
//!
//! `Value = { tag, subtype, body }` is modeled directly: [`ValueTag`] is
//! the discriminant, [`Subtype`] the protection bitmask, [`ValueBody`] the
//! payload. Every "shared" body in the spec table is an
//! [`std::rc::Rc`]-wrapped type; copying a `Value` clones the handle
//! (bumps the refcount) and mutation at a `&mut Value` entry point goes
//! through [`std::rc::Rc::make_mut`], giving copy-on-write without a
//! garbage collector or manual refcounting — the single-threaded
//! execution model (`spec.md` §5) makes `Rc` (over `Arc`) the right
//! choice.
//!
//! Every addressable location in the engine (a local, a global, a matrix
//! element, a list element, an object field, an association value) is a
//! [`Slot`] = `Rc<RefCell<Value>>`. `Value::Addr` is literally a `Slot`
//! clone, which is what lets `LOCALADDR`/`GLOBALADDR`/`FIADDR` and their
//! dereferencing counterparts share one representation instead of a
//! separate raw-pointer path per container kind.

pub mod assoc;
pub mod block;
pub mod hash_state;
pub mod list;
pub mod matrix;
pub mod object;
pub mod pointer;
pub mod prng;
pub mod subtype;

pub use assoc::Association;
pub use hash_state::{HashAlgorithm, HashState};
pub use list::List;
pub use matrix::{Bound, Matrix};
pub use object::{Object, Overload, Schema};
pub use pointer::{NamedBlock, Octet, Pointer};
pub use prng::{RandState, RandomState};
pub use subtype::Subtype;

use crate::config::ConfigSnapshot;
use crate::kernel::{C, Q};
use calc_asm::ErrorCode;
use std::cell::RefCell;
use std::rc::Rc;

/// A shared, addressable Value cell.
pub type Slot = Rc<RefCell<Value>>;

pub fn new_slot(value: Value) -> Slot {
    Rc::new(RefCell::new(value))
}

/// The tag discriminant of a [`Value`], mirroring the `tag` field of
/// `spec.md`'s `Value = { tag, subtype, body }` schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    Null,
    Int,
    Num,
    Com,
    Str,
    Mat,
    List,
    Assoc,
    Obj,
    File,
    Rand,
    Random,
    Config,
    Hash,
    Block,
    Octet,
    NBlock,
    Addr,
    Ptr,
    Error,
}

/// The payload of a [`Value`], selected by [`ValueTag`].
#[derive(Debug, Clone)]
pub enum ValueBody {
    Null,
    Int(i64),
    Num(Rc<Q>),
    Com(Rc<C>),
    Str(Rc<Vec<u8>>),
    Mat(Rc<Matrix>),
    List(Rc<List>),
    Assoc(Rc<Association>),
    Obj(Rc<Object>),
    File(u64),
    Rand(Rc<RandState>),
    Random(Rc<RandomState>),
    Config(Rc<ConfigSnapshot>),
    Hash(Rc<HashState>),
    Block(pointer::BlockData),
    Octet(Octet),
    NBlock(Rc<NamedBlock>),
    Addr(Slot),
    Ptr(Pointer),
    /// Negated `calc_asm::ErrorCode`, matching `spec.md` §6: "An Error
    /// Value carries the negated code in its tag field".
    Error(ErrorCode),
}

/// A fully-tagged calc value.
#[derive(Debug, Clone)]
pub struct Value {
    subtype: Subtype,
    body: ValueBody,
}

impl Value {
    pub fn new(body: ValueBody) -> Self {
        Value {
            subtype: Subtype::default(),
            body,
        }
    }

    pub fn with_subtype(body: ValueBody, subtype: Subtype) -> Self {
        Value { subtype, body }
    }

    pub fn null() -> Self {
        Value::new(ValueBody::Null)
    }

    pub fn int(v: i64) -> Self {
        Value::new(ValueBody::Int(v))
    }

    pub fn num(q: Q) -> Self {
        Value::new(ValueBody::Num(Rc::new(q)))
    }

    pub fn com(c: C) -> Self {
        Value::new(ValueBody::Com(Rc::new(c)))
    }

    pub fn string(bytes: Vec<u8>) -> Self {
        Value::new(ValueBody::Str(Rc::new(bytes)))
    }

    pub fn error(code: ErrorCode) -> Self {
        Value::new(ValueBody::Error(code))
    }

    pub fn body(&self) -> &ValueBody {
        &self.body
    }

    /// Mutable access to the body for in-place, copy-on-write updates.
    /// Callers that hold a cloned `Rc` elsewhere are unaffected: the
    /// `Rc::make_mut` calls inside `ValueBody`'s own mutator methods
    /// clone-on-demand.
    pub fn body_mut(&mut self) -> &mut ValueBody {
        &mut self.body
    }

    pub fn subtype(&self) -> Subtype {
        self.subtype
    }

    pub fn subtype_mut(&mut self) -> &mut Subtype {
        &mut self.subtype
    }

    pub fn tag(&self) -> ValueTag {
        match &self.body {
            ValueBody::Null => ValueTag::Null,
            ValueBody::Int(_) => ValueTag::Int,
            ValueBody::Num(_) => ValueTag::Num,
            ValueBody::Com(_) => ValueTag::Com,
            ValueBody::Str(_) => ValueTag::Str,
            ValueBody::Mat(_) => ValueTag::Mat,
            ValueBody::List(_) => ValueTag::List,
            ValueBody::Assoc(_) => ValueTag::Assoc,
            ValueBody::Obj(_) => ValueTag::Obj,
            ValueBody::File(_) => ValueTag::File,
            ValueBody::Rand(_) => ValueTag::Rand,
            ValueBody::Random(_) => ValueTag::Random,
            ValueBody::Config(_) => ValueTag::Config,
            ValueBody::Hash(_) => ValueTag::Hash,
            ValueBody::Block(_) => ValueTag::Block,
            ValueBody::Octet(_) => ValueTag::Octet,
            ValueBody::NBlock(_) => ValueTag::NBlock,
            ValueBody::Addr(_) => ValueTag::Addr,
            ValueBody::Ptr(_) => ValueTag::Ptr,
            ValueBody::Error(_) => ValueTag::Error,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.body, ValueBody::Null)
    }

    pub fn as_error(&self) -> Option<ErrorCode> {
        match self.body {
            ValueBody::Error(code) => Some(code),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match &self.body {
            ValueBody::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Promote to an exact rational if this value is Int, Num, or (when
    /// real) Com, per the "kernel fast path" / "promoted kernel path"
    /// rules of `spec.md` §4.2.
    pub fn as_q(&self) -> Option<Q> {
        match &self.body {
            ValueBody::Int(v) => Some(Q::from_integer(crate::kernel::Z::from_i64(*v))),
            ValueBody::Num(q) => Some((**q).clone()),
            ValueBody::Com(c) if c.is_real() => Some(c.real.clone()),
            _ => None,
        }
    }

    /// Promote to a Gaussian rational if this value is any numeric tag.
    pub fn as_c(&self) -> Option<C> {
        match &self.body {
            ValueBody::Int(v) => Some(C::from_real(Q::from_integer(crate::kernel::Z::from_i64(*v)))),
            ValueBody::Num(q) => Some(C::from_real((**q).clone())),
            ValueBody::Com(c) => Some((**c).clone()),
            _ => None,
        }
    }

    /// Build the appropriate numeric Value from a `C`, collapsing to
    /// `Num` when the imaginary part is zero (`spec.md` §3.1/§3.2).
    pub fn from_c(c: C) -> Value {
        match c.collapse() {
            Ok(q) => Value::num(q),
            Err(c) => Value::com(c),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.body,
            ValueBody::Int(_) | ValueBody::Num(_) | ValueBody::Com(_)
        )
    }

    /// "Truthy" per the engine's boolean interpretation (`spec.md` §4.3.3
    /// control opcodes): zero numerics and Null are falsy, everything
    /// else (including containers and strings, even empty ones) is
    /// truthy, matching real calc's "zero test" overload semantics for
    /// simple scalar types.
    pub fn is_truthy(&self) -> bool {
        match &self.body {
            ValueBody::Null => false,
            ValueBody::Int(v) => *v != 0,
            ValueBody::Num(q) => !q.is_zero(),
            ValueBody::Com(c) => !(c.real.is_zero() && c.imag.is_zero()),
            ValueBody::Error(_) => true,
            _ => true,
        }
    }
}

/// Structural equality used by [`Association`] bucket lookup and the
/// relational dispatch's `==`/`!=`. Addresses, pointers and the
/// external-resource kinds (`File`, `Rand`, `Random`) compare by handle
/// identity rather than by deep content: two generators with identical
/// state are still distinct resources. Subtype flags are not part of
/// value identity and are ignored here, matching `spec.md` §4.2.1.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use ValueBody::*;
        match (&self.body, &other.body) {
            (Null, Null) => true,
            (Int(a), Int(b)) => a == b,
            (Num(a), Num(b)) => a == b,
            (Com(a), Com(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Mat(a), Mat(b)) => {
                a.bounds() == b.bounds()
                    && a.elements().len() == b.elements().len()
                    && a.elements()
                        .iter()
                        .zip(b.elements())
                        .all(|(x, y)| *x.borrow() == *y.borrow())
            }
            (List(a), List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| *x.borrow() == *y.borrow())
            }
            (Assoc(a), Assoc(b)) => Rc::ptr_eq(a, b),
            (Obj(a), Obj(b)) => {
                a.schema.index == b.schema.index
                    && a.elements()
                        .iter()
                        .zip(b.elements())
                        .all(|(x, y)| *x.borrow() == *y.borrow())
            }
            (File(a), File(b)) => a == b,
            (Rand(a), Rand(b)) => a == b,
            (Random(a), Random(b)) => a == b,
            (Config(a), Config(b)) => a == b,
            (Hash(a), Hash(b)) => a == b,
            (Block(a), Block(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Octet(a), Octet(b)) => Rc::ptr_eq(&a.data, &b.data) && a.index == b.index,
            (NBlock(a), NBlock(b)) => a.name == b.name && Rc::ptr_eq(&a.data, &b.data),
            (Addr(a), Addr(b)) => Rc::ptr_eq(a, b),
            (Ptr(_), Ptr(_)) => false,
            (Error(a), Error(b)) => a == b,
            _ => false,
        }
    }
}
