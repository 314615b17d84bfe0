//! State Hashing
//!
//! SHA-256 digests of simulation values. Two runs that agree on a digest
//! agree bit-for-bit on every field that went into it, which is what
//! replay validation checks.

use sha2::{Sha256, Digest};

use glam::Vec2;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Domain prefix for character snapshots.
pub const CHARACTER_DOMAIN: &[u8] = b"LOCOMOTION_STATE_V1";

/// Domain prefix for input recordings.
pub const RECORDING_DOMAIN: &[u8] = b"LOCOMOTION_INPUTS_V1";

/// A value with a canonical byte encoding.
///
/// Integers are little-endian, floats go in by bit pattern (so `-0.0` and
/// `0.0` differ), and slices are length-prefixed.
pub trait HashInto {
    /// Feed this value to `hasher`.
    fn hash_into(&self, hasher: &mut StateHasher);
}

/// Incremental digest with a domain prefix.
pub struct StateHasher {
    digest: Sha256,
}

impl StateHasher {
    /// Start a digest under `domain`.
    pub fn with_domain(domain: &[u8]) -> Self {
        let mut digest = Sha256::new();
        digest.update(domain);
        Self { digest }
    }

    /// Raw bytes, no framing.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.digest.update(bytes);
        self
    }

    /// Any hashable value. Order of writes is part of the digest.
    #[inline]
    pub fn write<T: HashInto + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.hash_into(self);
        self
    }

    /// Consume and produce the digest.
    pub fn finish(self) -> StateHash {
        self.digest.finalize().into()
    }
}

impl HashInto for u8 {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.write_bytes(&[*self]);
    }
}

impl HashInto for u32 {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.write_bytes(&self.to_le_bytes());
    }
}

impl HashInto for u64 {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.write_bytes(&self.to_le_bytes());
    }
}

impl HashInto for bool {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.write(&(*self as u8));
    }
}

impl HashInto for f32 {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.write(&self.to_bits());
    }
}

impl HashInto for Vec2 {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.write(&self.x).write(&self.y);
    }
}

impl<T: HashInto> HashInto for [T] {
    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.write(&(self.len() as u64));
        for item in self {
            hasher.write(item);
        }
    }
}

/// Digest of a snapshot taken at `tick`.
///
/// The tick always leads so identical states at different ticks differ.
pub fn compute_state_hash<F>(domain: &[u8], tick: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::with_domain(domain);
    hasher.write(&tick);
    add_state(&mut hasher);
    hasher.finish()
}

// =============================================================================
// TESTS
// =============================================================================
