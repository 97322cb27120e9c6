//! SHA-256 structure hashing for page fingerprints.
//!
//! Implements the `StructureHasher` trait from `semantest-core` using the
//! `sha2` crate (RustCrypto ecosystem).

use sha2::{Digest, Sha256};

use semantest_core::fingerprint::hasher::StructureHasher;

/// SHA-256 implementation of `StructureHasher`.
///
/// Computes lowercase hex-encoded SHA-256 digests of DOM outlines. Two
/// snapshots with the same structural outline always produce the same
/// fingerprint, across processes and restarts.
pub struct Sha256StructureHasher;

impl Sha256StructureHasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self
    }
}

impl Default for Sha256StructureHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureHasher for Sha256StructureHasher {
    fn hash_structure(&self, outline: &str) -> String {
        let digest = Sha256::digest(outline.as_bytes());
        format!("{:x}", digest)
    }
}
