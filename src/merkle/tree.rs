//! Merkle Tree Builder
//!
//! Builds the allocation tree and extracts per-entry inclusion proofs.
//! This is tooling for tests, the demo mode, and front-ends preparing
//! claims - the distributor itself only ever verifies.
//!
//! Tree shape: leaves are double-hashed (identity, amount) entries, interior
//! nodes hash the smaller child first, and a level with an odd node count
//! duplicates its last node upward.

use crate::types::{Digest32, Identity, ZERO_DIGEST};

use super::{compute_leaf, hash_pair};

/// Allocation merkle tree over (identity, amount) entries.
///
/// Levels are stored consecutively in one vector: leaves first, then each
/// parent level, ending with the root.
pub struct MerkleTree {
    nodes: Vec<Digest32>,
    leaf_count: usize,
    entries: Vec<(Identity, u64)>,
}

impl MerkleTree {
    /// Build a tree from allocation entries. Entry order fixes leaf order.
    pub fn new(entries: Vec<(Identity, u64)>) -> Self {
        let leaf_count = entries.len();
        let mut nodes: Vec<Digest32> = entries
            .iter()
            .map(|(identity, amount)| compute_leaf(identity, *amount))
            .collect();

        let mut level_start = 0;
        let mut level_len = leaf_count;
        while level_len > 1 {
            let next_len = level_len.div_ceil(2);
            for i in 0..next_len {
                let left = nodes[level_start + 2 * i];
                let right = if 2 * i + 1 < level_len {
                    nodes[level_start + 2 * i + 1]
                } else {
                    // odd node count: duplicate the last node
                    left
                };
                nodes.push(hash_pair(&left, &right));
            }
            level_start += level_len;
            level_len = next_len;
        }

        Self {
            nodes,
            leaf_count,
            entries,
        }
    }

    /// Root commitment. Zero digest for an empty tree.
    pub fn root(&self) -> Digest32 {
        match self.nodes.last() {
            Some(root) => *root,
            None => ZERO_DIGEST,
        }
    }

    /// Number of allocation entries
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// Inclusion proof for the entry at `index` (leaf order), sibling
    /// digests from leaf level to just below the root.
    pub fn proof(&self, index: usize) -> Option<Vec<Digest32>> {
        if index >= self.leaf_count {
            return None;
        }

        let mut proof = Vec::new();
        let mut idx = index;
        let mut level_start = 0;
        let mut level_len = self.leaf_count;

        while level_len > 1 {
            let sibling = idx ^ 1;
            let sibling_idx = if sibling < level_len { sibling } else { idx };
            proof.push(self.nodes[level_start + sibling_idx]);

            level_start += level_len;
            level_len = level_len.div_ceil(2);
            idx /= 2;
        }

        Some(proof)
    }

    /// Inclusion proof for an identity's entry, if present
    pub fn proof_for(&self, identity: &Identity) -> Option<Vec<Digest32>> {
        let index = self.entries.iter().position(|(id, _)| id == identity)?;
        self.proof(index)
    }

    /// Allotted amount for an identity, if present
    pub fn amount_for(&self, identity: &Identity) -> Option<u64> {
        self.entries
            .iter()
            .find(|(id, _)| id == identity)
            .map(|(_, amount)| *amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::verify;

    fn entries(n: usize) -> Vec<(Identity, u64)> {
        (0..n)
            .map(|i| (Identity::new([i as u8 + 1; 32]), (i as u64 + 1) * 100))
            .collect()
    }

    #[test]
    fn test_empty_tree_root_is_zero() {
        let tree = MerkleTree::new(vec![]);
        assert_eq!(tree.root(), ZERO_DIGEST);
        assert!(tree.is_empty());
        assert!(tree.proof(0).is_none());
    }

    #[test]
    fn test_single_entry_tree() {
        let tree = MerkleTree::new(entries(1));
        let leaf = compute_leaf(&Identity::new([1; 32]), 100);
        assert_eq!(tree.root(), leaf);
        assert_eq!(tree.proof(0).unwrap(), Vec::<Digest32>::new());
    }

    #[test]
    fn test_all_proofs_verify() {
        for n in [2usize, 3, 4, 5, 8, 13] {
            let items = entries(n);
            let tree = MerkleTree::new(items.clone());
            let root = tree.root();
            for (i, (identity, amount)) in items.iter().enumerate() {
                let proof = tree.proof(i).unwrap();
                let leaf = compute_leaf(identity, *amount);
                assert!(verify(&proof, root, leaf), "n={} i={}", n, i);
            }
        }
    }

    #[test]
    fn test_proof_rejects_wrong_entry() {
        let items = entries(5);
        let tree = MerkleTree::new(items);
        let root = tree.root();
        let proof = tree.proof(2).unwrap();

        // right proof, wrong amount
        let leaf = compute_leaf(&Identity::new([3; 32]), 999);
        assert!(!verify(&proof, root, leaf));

        // right proof, wrong identity
        let leaf = compute_leaf(&Identity::new([9; 32]), 300);
        assert!(!verify(&proof, root, leaf));
    }

    #[test]
    fn test_proof_for_identity_lookup() {
        let items = entries(4);
        let tree = MerkleTree::new(items);
        let id = Identity::new([2; 32]);

        assert_eq!(tree.amount_for(&id), Some(200));
        let proof = tree.proof_for(&id).unwrap();
        assert!(verify(&proof, tree.root(), compute_leaf(&id, 200)));

        let absent = Identity::new([99; 32]);
        assert!(tree.proof_for(&absent).is_none());
        assert!(tree.amount_for(&absent).is_none());
    }
}
