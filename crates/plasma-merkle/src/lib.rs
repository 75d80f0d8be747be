//! # plasma-merkle
//!
//! **Sparse Merkle commitments for Plasma Cash blocks.**
//!
//! Every operator block commits to at most one transaction per coin. The
//! commitment is a depth-64 sparse Merkle tree whose leaf at index `slot` is
//! the hash of the transaction moving that coin, or the empty leaf.
//!
//! - **Deterministic**: the root depends only on the set of (slot, leaf) pairs
//! - **Compact proofs**: a 64-bit bitmap marks which siblings are non-default;
//!   only those are carried
//! - **Exclusion proofs**: the same proof shape shows a slot was untouched

pub mod hash;
pub mod proof;
pub mod tree;

pub use hash::{EMPTY_LEAF, default_hash, empty_root, hash_pair};
pub use proof::MerkleProof;
pub use tree::SparseMerkleTree;
