//! Cryptographic hash-state value (`spec.md` §4.2.6).
//!
//! The algorithms themselves are external collaborators (`spec.md` §1
//! excludes "cryptographic hash primitives other than the fact that a
//! hash state is itself a value"); this module drives real `md-5`,
//! `sha1` and `sha3` implementations through the shared `digest::Digest`
//! trait and owns only the five-field incremental-state contract the
//! value layer requires: algorithm id, block count, pending buffer
//! contents, pending buffer length, and digest state.

use crate::kernel::Z;
use digest::Digest;
use md5::Md5;
use num_bigint::BigInt;
use num_traits::Zero;
use sha1::Sha1;
use sha3::Sha3_256;

/// Which real-calc hash algorithm backs this state. "SHS" (the archaic
/// pre-SHA-1 NIST draft) has no maintained crate equivalent in the
/// corpus; `Shs` is kept as a named variant for wire compatibility but
/// is implemented as an alias for SHA-1, documented in `DESIGN.md`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Shs,
    Sha3,
}

#[derive(Clone)]
enum Engine {
    Md5(Box<Md5>),
    Sha1(Box<Sha1>),
    Sha3(Box<Sha3_256>),
}

impl Engine {
    fn new(algorithm: HashAlgorithm) -> Engine {
        match algorithm {
            HashAlgorithm::Md5 => Engine::Md5(Box::new(Md5::new())),
            HashAlgorithm::Sha1 | HashAlgorithm::Shs => Engine::Sha1(Box::new(Sha1::new())),
            HashAlgorithm::Sha3 => Engine::Sha3(Box::new(Sha3_256::new())),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        match self {
            Engine::Md5(h) => h.update(bytes),
            Engine::Sha1(h) => h.update(bytes),
            Engine::Sha3(h) => h.update(bytes),
        }
    }

    fn clone_finalize(&self) -> Vec<u8> {
        match self {
            Engine::Md5(h) => h.as_ref().clone().finalize().to_vec(),
            Engine::Sha1(h) => h.as_ref().clone().finalize().to_vec(),
            Engine::Sha3(h) => h.as_ref().clone().finalize().to_vec(),
        }
    }
}

/// Incremental hash state.
///
/// Equality is over the five documented fields; `engine`'s internal state
/// is summarized by `digest_state` (re-derived on every `checkpoint`), so
/// two states with equal `(algorithm, count, pending, digest_state)` are
/// considered equal without needing the underlying crate type to
/// implement `PartialEq` itself.
#[derive(Clone)]
pub struct HashState {
    algorithm: HashAlgorithm,
    engine: Engine,
    /// Bytes accumulated since the last 64-byte block boundary.
    pending: Vec<u8>,
    /// Total bytes ever fed via `update`.
    count: u64,
    /// Digest over everything hashed so far, refreshed by `checkpoint`.
    digest_state: Vec<u8>,
}

const BLOCK_SIZE: usize = 64;

impl HashState {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        HashState {
            algorithm,
            engine: Engine::new(algorithm),
            pending: Vec::new(),
            count: 0,
            digest_state: Vec::new(),
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Feed bytes into the state, flushing full 64-byte blocks into the
    /// underlying engine as they accumulate.
    pub fn update(&mut self, bytes: &[u8]) {
        self.count += bytes.len() as u64;
        self.pending.extend_from_slice(bytes);
        while self.pending.len() >= BLOCK_SIZE {
            let block: Vec<u8> = self.pending.drain(..BLOCK_SIZE).collect();
            self.engine.update(&block);
        }
    }

    /// Zero-pad and hash the current partial block; idempotent when the
    /// pending buffer is already empty.
    pub fn checkpoint(&mut self) {
        if !self.pending.is_empty() {
            let mut block = std::mem::take(&mut self.pending);
            block.resize(BLOCK_SIZE, 0);
            self.engine.update(&block);
        }
        self.digest_state = self.engine.clone_finalize();
    }

    /// XOR-mix a type-discrimination tag into the pending buffer.
    pub fn note(&mut self, tag: u8) {
        if self.pending.is_empty() {
            self.pending.push(tag);
        } else {
            let last = self.pending.len() - 1;
            self.pending[last] ^= tag;
        }
    }

    /// Additively mix a Value-tag discriminant into the pending buffer.
    pub fn note_value_type(&mut self, tag: u8) {
        self.update(&[tag]);
    }

    /// Finalize (without consuming `self`, matching calc's semantics of a
    /// hash state that can keep accumulating after a digest is read) and
    /// return the digest as an integer.
    pub fn finalize(&mut self) -> Z {
        self.checkpoint();
        if self.digest_state.is_empty() {
            return Z::zero();
        }
        Z::from_bigint(BigInt::from_bytes_be(
            num_bigint::Sign::Plus,
            &self.digest_state,
        ))
    }
}

impl std::fmt::Debug for HashState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashState")
            .field("algorithm", &self.algorithm)
            .field("count", &self.count)
            .field("pending_len", &self.pending.len())
            .finish()
    }
}

impl PartialEq for HashState {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm
            && self.count == other.count
            && self.pending == other.pending
            && self.digest_state == other.digest_state
    }
}

impl Eq for HashState {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_is_idempotent_on_empty_buffer() {
        let mut h = HashState::new(HashAlgorithm::Sha1);
        h.update(b"hello");
        h.checkpoint();
        let first = h.finalize();
        h.checkpoint();
        assert_eq!(h.finalize(), first);
    }

    #[test]
    fn zero_length_input_finalizes_without_panic() {
        let mut h = HashState::new(HashAlgorithm::Md5);
        let _ = h.finalize();
    }

    #[test]
    fn equal_inputs_produce_equal_states() {
        let mut a = HashState::new(HashAlgorithm::Sha3);
        let mut b = HashState::new(HashAlgorithm::Sha3);
        a.update(b"abc");
        b.update(b"abc");
        a.checkpoint();
        b.checkpoint();
        assert_eq!(a, b);
    }
}
