//! Compact sparse Merkle proofs.
//!
//! Encoding: an 8-byte big-endian bitmap followed by 32-byte siblings.
//! Bit `i` of the bitmap (counting from the leaf, `i = 0`) is set when the
//! sibling at that level is non-default; only set bits carry a sibling,
//! listed leaf-first. All other siblings are the empty-subtree hash of
//! their level.

use plasma_types::{
    Hash, PlasmaError, Result, Slot,
    constants::{MAX_PROOF_LEN, PROOF_BITMAP_LEN, TREE_DEPTH},
};
use serde::{Deserialize, Serialize};

use crate::hash::{EMPTY_LEAF, default_hash, hash_pair};

/// Path from one leaf to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Which levels carry an explicit sibling.
    pub bitmap: u64,
    /// Non-default siblings, leaf level first.
    pub siblings: Vec<Hash>,
}

impl MerkleProof {
    /// Recompute the root implied by placing `leaf` at `slot`.
    ///
    /// # Errors
    /// Returns `MalformedProof` if the bitmap and sibling count disagree.
    pub fn compute_root(&self, slot: Slot, leaf: &Hash) -> Result<Hash> {
        let expected = self.bitmap.count_ones() as usize;
        if expected != self.siblings.len() {
            return Err(PlasmaError::MalformedProof {
                reason: format!(
                    "bitmap marks {expected} siblings, proof carries {}",
                    self.siblings.len()
                ),
            });
        }

        let mut node = *leaf;
        let mut carried = self.siblings.iter();
        for level in 0..TREE_DEPTH {
            let sibling = if (self.bitmap >> level) & 1 == 1 {
                // count checked above
                carried.next().copied().unwrap_or(EMPTY_LEAF)
            } else {
                default_hash(level)
            };
            node = if (slot.0 >> level) & 1 == 0 {
                hash_pair(&node, &sibling)
            } else {
                hash_pair(&sibling, &node)
            };
        }
        Ok(node)
    }

    /// Does the proof show `leaf` at `slot` under `root`?
    ///
    /// A malformed proof never verifies.
    #[must_use]
    pub fn verify(&self, slot: Slot, leaf: &Hash, root: &Hash) -> bool {
        self.compute_root(slot, leaf)
            .is_ok_and(|computed| computed == *root)
    }

    /// Does the proof show that `slot` holds no transaction under `root`?
    #[must_use]
    pub fn verify_exclusion(&self, slot: Slot, root: &Hash) -> bool {
        self.verify(slot, &EMPTY_LEAF, root)
    }

    /// Encode as bitmap followed by siblings.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PROOF_BITMAP_LEN + self.siblings.len() * 32);
        out.extend_from_slice(&self.bitmap.to_be_bytes());
        for sibling in &self.siblings {
            out.extend_from_slice(sibling);
        }
        out
    }

    /// Decode the output of [`Self::to_bytes`].
    ///
    /// # Errors
    /// Returns `MalformedProof` if the length is wrong for the bitmap.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < PROOF_BITMAP_LEN || bytes.len() > MAX_PROOF_LEN {
            return Err(PlasmaError::MalformedProof {
                reason: format!("proof length {} out of range", bytes.len()),
            });
        }
        let (head, body) = bytes.split_at(PROOF_BITMAP_LEN);
        let mut bitmap_bytes = [0u8; PROOF_BITMAP_LEN];
        bitmap_bytes.copy_from_slice(head);
        let bitmap = u64::from_be_bytes(bitmap_bytes);

        let expected = bitmap.count_ones() as usize;
        if body.len() != expected * 32 {
            return Err(PlasmaError::MalformedProof {
                reason: format!(
                    "bitmap marks {expected} siblings, found {} bytes",
                    body.len()
                ),
            });
        }

        let siblings = body
            .chunks_exact(32)
            .map(|chunk| {
                let mut sibling = [0u8; 32];
                sibling.copy_from_slice(chunk);
                sibling
            })
            .collect();
        Ok(Self { bitmap, siblings })
    }
}

impl std::fmt::Display for MerkleProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}
