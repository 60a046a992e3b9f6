//! Value protection flags (`spec.md` §3.2).

use bitflags::bitflags;

bitflags! {
    /// Per-value protection bitmask. Propagates unchanged on copy; a
    /// dispatch that merges two values (e.g. assignment) unions the two
    /// masks.
    pub struct Subtype: u32 {
        /// Destination cannot be written.
        const NO_ASSIGN_TO = 0x001;
        /// Writes must not change equality.
        const NO_NEW_VALUE = 0x002;
        /// Writes must not change tag.
        const NO_NEW_TYPE = 0x004;
        /// Writes must not store an Error.
        const NO_ERROR = 0x008;
        const NO_COPY_TO = 0x010;
        const NO_REALLOCATE = 0x020;
        const NO_ASSIGN_FROM = 0x040;
        const NO_COPY_FROM = 0x080;
        /// Protect recursively.
        const PROTECT_ALL = 0x100;
    }
}

impl Default for Subtype {
    fn default() -> Self {
        Subtype::empty()
    }
}

impl Subtype {
    /// Union `other` into `self`, matching the merge-on-dispatch rule
    /// `spec.md` §8 tests: "a superset after any dispatch that unions
    /// source and destination flags".
    pub fn merge(self, other: Subtype) -> Subtype {
        self | other
    }
}
