//! Hash map from a tuple of Values to a Value (`spec.md` §3.5).
//!
//! Collisions chain, matching the spec literally: each bucket, keyed by
//! [`crate::dispatch::hashing::quickhash_tuple`], holds a `Vec` of
//! `(key tuple, value slot)` pairs compared by structural equality.

use crate::dispatch::hashing::quickhash_tuple;
use crate::value::{Slot, Value};

#[derive(Debug, Clone)]
pub struct Association {
    dim: usize,
    buckets: std::collections::HashMap<u32, Vec<(Vec<Value>, Slot)>>,
}

impl Association {
    pub fn new(dim: usize) -> Self {
        Association {
            dim,
            buckets: std::collections::HashMap::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(|chain| chain.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, key: &[Value]) -> Option<Slot> {
        let bucket = self.buckets.get(&quickhash_tuple(key))?;
        bucket
            .iter()
            .find(|(k, _)| k.as_slice() == key)
            .map(|(_, v)| v.clone())
    }

    /// Find the slot for `key`, inserting a fresh `Null` slot if absent
    /// (the "writable" path of `spec.md` §4.2.4's `index` operation).
    pub fn find_or_insert(&mut self, key: &[Value]) -> Slot {
        let hash = quickhash_tuple(key);
        let bucket = self.buckets.entry(hash).or_default();
        if let Some((_, slot)) = bucket.iter().find(|(k, _)| k.as_slice() == key) {
            return slot.clone();
        }
        let slot = crate::value::new_slot(Value::null());
        bucket.push((key.to_vec(), slot.clone()));
        slot
    }
}
