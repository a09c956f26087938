//! The checksum hash `H` used by [`crate::cell::Cell`] purity checks.
//!
//! Any fast non-cryptographic 64-bit keyed hash is admissible (`spec.md`
//! §4.1); both peers in a session MUST agree on the variant and seed, which
//! is why both live in [`crate::config::ReconcileConfig`] rather than being
//! hardcoded.

use serde::{Deserialize, Serialize};

/// Which 64-bit hash family backs [`HashContext::hash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashVariant {
    Xxh32,
    Xxh64,
    Xxh3_64,
}

impl Default for HashVariant {
    fn default() -> Self {
        HashVariant::Xxh64
    }
}

/// A keyed hash instance shared by both peers of a session.
///
/// `seed` plays the role of the key: it MUST match on both sides or cells
/// that are structurally identical will disagree on checksum, turning every
/// cell impure.
#[derive(Debug, Clone, Copy)]
pub struct HashContext {
    variant: HashVariant,
    seed: u64,
}

impl HashContext {
    pub fn new(variant: HashVariant, seed: u64) -> Self {
        Self { variant, seed }
    }

    pub fn variant(&self) -> HashVariant {
        self.variant
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// H(symbol): a deterministic 64-bit digest, keyed by `seed`.
    pub fn hash(&self, symbol: u64) -> u64 {
        let bytes = symbol.to_le_bytes();
        match self.variant {
            HashVariant::Xxh32 => xxhash_rust::xxh32::xxh32(&bytes, self.seed as u32) as u64,
            HashVariant::Xxh64 => xxhash_rust::xxh64::xxh64(&bytes, self.seed),
            HashVariant::Xxh3_64 => xxhash_rust::xxh3::xxh3_64_with_seed(&bytes, self.seed),
        }
    }
}
