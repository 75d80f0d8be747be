//! The sparse Merkle tree for one block.
//!
//! Only non-empty nodes are stored, one `HashMap<index, hash>` per level.
//! Level 0 holds the leaves keyed by slot; level `TREE_DEPTH` holds the root
//! at index 0. Any missing node is the empty-subtree hash of its level.

use std::collections::{BTreeMap, HashMap};

use plasma_types::{Hash, PlasmaError, Result, SignedTransaction, Slot, constants::TREE_DEPTH};

use crate::hash::{default_hash, empty_root, hash_pair};
use crate::proof::MerkleProof;

/// Sparse Merkle tree keyed by 64-bit slot.
#[derive(Debug, Clone)]
pub struct SparseMerkleTree {
    /// Committed leaves in slot order.
    leaves: BTreeMap<Slot, Hash>,
    /// Non-default nodes per level, leaf level first.
    levels: Vec<HashMap<u64, Hash>>,
}

impl SparseMerkleTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            leaves: BTreeMap::new(),
            levels: vec![HashMap::new(); TREE_DEPTH + 1],
        }
    }

    /// Build the tree for a block from its transactions.
    ///
    /// # Errors
    /// Returns `DuplicateLeaf` if two transactions move the same coin.
    pub fn from_transactions(txs: &[SignedTransaction]) -> Result<Self> {
        let mut tree = Self::new();
        for tx in txs {
            tree.insert(tx.tx.slot, tx.hash())?;
        }
        tracing::debug!(
            leaves = tree.len(),
            root = %hex::encode(tree.root()),
            "Built block tree"
        );
        Ok(tree)
    }

    // =================================================================
    // Mutation
    // =================================================================

    /// Place `leaf` at `slot` and rehash the path to the root.
    ///
    /// # Errors
    /// Returns `DuplicateLeaf` if the slot already holds a leaf.
    pub fn insert(&mut self, slot: Slot, leaf: Hash) -> Result<()> {
        if self.leaves.contains_key(&slot) {
            return Err(PlasmaError::DuplicateLeaf(slot));
        }
        self.leaves.insert(slot, leaf);

        let mut index = slot.0;
        let mut node = leaf;
        self.levels[0].insert(index, node);
        for level in 0..TREE_DEPTH {
            let sibling = self.node(level, index ^ 1);
            node = if index & 1 == 0 {
                hash_pair(&node, &sibling)
            } else {
                hash_pair(&sibling, &node)
            };
            index >>= 1;
            self.levels[level + 1].insert(index, node);
        }
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    fn node(&self, level: usize, index: u64) -> Hash {
        self.levels[level]
            .get(&index)
            .copied()
            .unwrap_or_else(|| default_hash(level))
    }

    /// Current root. The empty tree's root is the all-default hash.
    #[must_use]
    pub fn root(&self) -> Hash {
        self.levels[TREE_DEPTH]
            .get(&0)
            .copied()
            .unwrap_or_else(empty_root)
    }

    /// Proof for `slot`. For an empty slot this is an exclusion proof.
    #[must_use]
    pub fn proof(&self, slot: Slot) -> MerkleProof {
        let mut proof = MerkleProof::default();
        for level in 0..TREE_DEPTH {
            let sibling = self.node(level, (slot.0 >> level) ^ 1);
            if sibling != default_hash(level) {
                proof.bitmap |= 1u64 << level;
                proof.siblings.push(sibling);
            }
        }
        proof
    }

    /// The leaf committed at `slot`, if any.
    #[must_use]
    pub fn leaf(&self, slot: Slot) -> Option<Hash> {
        self.leaves.get(&slot).copied()
    }

    /// Number of committed leaves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

impl Default for SparseMerkleTree {
    fn default() -> Self {
        Self::new()
    }
}
