//! Identifiers used throughout the root chain.
//!
//! Accounts are raw ed25519 public keys. Slots, block numbers and asset ids
//! are plain `u64` newtypes so they order and hash the same on every node.

use std::fmt;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{PlasmaError, Result};

/// A 32-byte SHA-256 digest: transaction hashes, Merkle nodes, block roots.
pub type Hash = [u8; 32];

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// An account on the root chain.
/// This is the raw ed25519 public key (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    #[must_use]
    pub fn from_pubkey(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Decode the address as an ed25519 verifying key.
    ///
    /// # Errors
    /// Returns `InvalidSignature` if the bytes are not a valid curve point.
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(&self.0).map_err(|e| PlasmaError::InvalidSignature {
            reason: format!("address {self} is not an ed25519 key: {e}"),
        })
    }
}

impl From<VerifyingKey> for Address {
    fn from(key: VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// The lifeline of one coin across all of its transfers.
///
/// Doubles as the coin's leaf index in every sparse Merkle tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Slot(pub u64);

impl Slot {
    /// Deterministic slot for a deposit.
    ///
    /// `nonce` is the registry-wide deposit counter, so re-depositing the
    /// same asset after a withdrawal yields a fresh slot.
    #[must_use]
    pub fn derive(registry: &Address, depositor: &Address, asset_id: AssetId, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"plasma:slot:v1:");
        hasher.update(registry.as_bytes());
        hasher.update(depositor.as_bytes());
        hasher.update(asset_id.0.to_be_bytes());
        hasher.update(nonce.to_be_bytes());
        let hash = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&hash[..8]);
        Self(u64::from_be_bytes(prefix))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot:{:016x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// BlockNumber
// ---------------------------------------------------------------------------

/// Number of a committed child-chain block.
///
/// Block 0 is never committed; it stands for "no block".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct BlockNumber(pub u64);

impl BlockNumber {
    pub const NULL: Self = Self(crate::constants::NULL_BLOCK);

    /// The following block number, or `None` once `u64::MAX` is taken.
    #[must_use]
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    #[must_use]
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Identifier of the underlying non-fungible asset inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AssetId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
