//! Node hashing and the precomputed empty-subtree hashes.

use std::sync::OnceLock;

use plasma_types::{Hash, constants::TREE_DEPTH};
use sha2::{Digest, Sha256};

/// Leaf value of a slot with no transaction in the block.
pub const EMPTY_LEAF: Hash = [0u8; 32];

/// Hash of an interior node.
///
/// Format: `SHA-256("plasma:smt:v1:" || left || right)`
#[must_use]
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(b"plasma:smt:v1:");
    hasher.update(left);
    hasher.update(right);
    let result = hasher.finalize();
    let mut node = [0u8; 32];
    node.copy_from_slice(&result);
    node
}

fn default_hashes() -> &'static [Hash] {
    static DEFAULTS: OnceLock<Vec<Hash>> = OnceLock::new();
    DEFAULTS.get_or_init(|| {
        let mut levels = Vec::with_capacity(TREE_DEPTH + 1);
        levels.push(EMPTY_LEAF);
        for level in 0..TREE_DEPTH {
            let below = &levels[level];
            let node = hash_pair(below, below);
            levels.push(node);
        }
        levels
    })
}

/// Root of an entirely empty subtree whose leaves sit `level` levels below.
///
/// `default_hash(0)` is the empty leaf, `default_hash(TREE_DEPTH)` the root
/// of an empty tree. Levels past the root clamp to the root.
#[must_use]
pub fn default_hash(level: usize) -> Hash {
    default_hashes()[level.min(TREE_DEPTH)]
}

/// Root of a tree with no leaves.
#[must_use]
pub fn empty_root() -> Hash {
    default_hash(TREE_DEPTH)
}
