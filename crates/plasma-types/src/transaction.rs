//! Off-ledger coin transfers.
//!
//! A [`Transaction`] moves one coin to a new owner. Its hash is the leaf the
//! operator commits at index `slot` of a block's sparse Merkle tree. The
//! signature is carried alongside in [`SignedTransaction`] and is not part of
//! the committed leaf.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Address, BlockNumber, Hash, PlasmaError, Result, Slot};

/// A transfer of the coin at `slot` to `new_owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The coin being moved.
    pub slot: Slot,
    /// Block holding the transaction that gave the sender ownership.
    /// [`BlockNumber::NULL`] for the synthetic deposit transaction.
    pub prev_block: BlockNumber,
    /// Value of the coin.
    pub denomination: u64,
    /// Recipient.
    pub new_owner: Address,
}

impl Transaction {
    /// The synthetic self-transfer committed by a deposit block.
    #[must_use]
    pub fn deposit(slot: Slot, owner: Address, denomination: u64) -> Self {
        Self {
            slot,
            prev_block: BlockNumber::NULL,
            denomination,
            new_owner: owner,
        }
    }

    /// A transfer spending the output created in `prev_block`.
    #[must_use]
    pub fn transfer(slot: Slot, prev_block: BlockNumber, denomination: u64, to: Address) -> Self {
        Self {
            slot,
            prev_block,
            denomination,
            new_owner: to,
        }
    }

    /// Whether this is a deposit self-transfer.
    #[must_use]
    pub fn is_deposit(&self) -> bool {
        self.prev_block.is_null()
    }

    /// Canonical signing payload.
    ///
    /// Format: `"plasma:tx:v1:" || slot || prev_block || denomination || new_owner`
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(13 + 8 + 8 + 8 + 32);
        payload.extend_from_slice(b"plasma:tx:v1:");
        payload.extend_from_slice(&self.slot.0.to_be_bytes());
        payload.extend_from_slice(&self.prev_block.0.to_be_bytes());
        payload.extend_from_slice(&self.denomination.to_be_bytes());
        payload.extend_from_slice(self.new_owner.as_bytes());
        payload
    }

    /// SHA-256 of the signing payload. This is the Merkle leaf.
    #[must_use]
    pub fn hash(&self) -> Hash {
        let digest = Sha256::digest(self.signing_payload());
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&digest);
        hash
    }

    /// Sign the transaction with the current owner's key.
    #[must_use]
    pub fn sign(self, key: &SigningKey) -> SignedTransaction {
        let signature = key.sign(&self.signing_payload());
        SignedTransaction {
            tx: self,
            signature: signature.to_bytes().to_vec(),
        }
    }
}

/// A transaction together with the sender's ed25519 signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: Transaction,
    /// Ed25519 signature over [`Transaction::signing_payload`].
    pub signature: Vec<u8>,
}

impl SignedTransaction {
    /// The committed leaf for this transaction.
    #[must_use]
    pub fn hash(&self) -> Hash {
        self.tx.hash()
    }

    /// Verify that `signer` produced the signature.
    ///
    /// # Errors
    /// Returns `InvalidSignature` if the signature is malformed, the signer
    /// is not a valid key, or verification fails.
    pub fn verify_signer(&self, signer: &Address) -> Result<()> {
        let key = signer.verifying_key()?;
        let signature =
            Signature::from_slice(&self.signature).map_err(|e| PlasmaError::InvalidSignature {
                reason: format!("malformed signature on {}: {e}", self.tx.slot),
            })?;
        key.verify(&self.tx.signing_payload(), &signature)
            .map_err(|e| PlasmaError::InvalidSignature {
                reason: format!("{signer} did not sign transfer of {}: {e}", self.tx.slot),
            })
    }

    /// `true` if `signer` produced the signature.
    #[must_use]
    pub fn is_signed_by(&self, signer: &Address) -> bool {
        self.verify_signer(signer).is_ok()
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tx[{}] prev={} -> {} ({})",
            self.slot, self.prev_block, self.new_owner, self.denomination,
        )
    }
}
