//! Merkle Accumulator Verifier
//!
//! Decides whether a claimed (identity, amount) pair belongs to the published
//! allocation set, given a compact inclusion proof against the 32-byte
//! commitment root.
//!
//! Two properties of the scheme are load-bearing and must not change:
//!
//! - Leaves are **double** SHA-256 hashes of the encoded pair. Hashing twice
//!   prevents an interior tree node from being replayed as a leaf
//!   (second-preimage defense).
//! - Interior nodes hash the byte-wise smaller child first. Verification is
//!   therefore position-agnostic: proofs carry no left/right flags, only the
//!   ordered sibling digests from leaf to root.

use sha2::{Digest, Sha256};

use crate::types::{Digest32, Identity};

pub mod tree;

pub use tree::MerkleTree;

/// Compute the leaf digest for one allocation entry.
///
/// Encoding: 32 identity bytes followed by the amount as 8 little-endian
/// bytes, then SHA-256 applied twice.
pub fn compute_leaf(identity: &Identity, amount: u64) -> Digest32 {
    let mut encoded = [0u8; 40];
    encoded[..32].copy_from_slice(identity.as_bytes());
    encoded[32..].copy_from_slice(&amount.to_le_bytes());
    double_sha256(&encoded)
}

/// Verify an inclusion proof: fold `leaf` through the sibling sequence and
/// compare against `root`. Returns false on any mismatch.
pub fn verify(proof: &[Digest32], root: Digest32, leaf: Digest32) -> bool {
    let mut computed = leaf;
    for sibling in proof {
        computed = hash_pair(&computed, sibling);
    }
    computed == root
}

/// Hash an interior node from two children, smaller byte sequence first
pub fn hash_pair(a: &Digest32, b: &Digest32) -> Digest32 {
    let mut hasher = Sha256::new();
    if a <= b {
        hasher.update(a);
        hasher.update(b);
    } else {
        hasher.update(b);
        hasher.update(a);
    }
    hasher.finalize().into()
}

/// Double SHA-256 (leaf hashing)
pub fn double_sha256(data: &[u8]) -> Digest32 {
    let first: Digest32 = Sha256::digest(data).into();
    Sha256::digest(first).into()
}
