//! Ownership history verification.
//!
//! An exit proves only the last two hops of a coin's history: the exiting
//! transaction and the prior transaction whose recipient signed it. Fraud
//! deeper in the history is left to challenges.
//!
//! ```text
//!   prior (block P)            exiting (block E > P)
//!   ┌──────────────┐  signs    ┌─────────────────────┐
//!   │ new_owner: B ├──────────▶│ prev_block: P       │
//!   └──────────────┘           │ new_owner: claimant │
//!                              └─────────────────────┘
//! ```

use plasma_merkle::MerkleProof;
use plasma_types::{
    Address, BlockNumber, Coin, PlasmaError, Result, SignedTransaction, Slot, Transaction,
};
use serde::{Deserialize, Serialize};

use crate::block_store::{BlockKind, BlockStore};

/// A signed transaction with its claimed inclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedTransaction {
    pub tx: SignedTransaction,
    pub block: BlockNumber,
    /// Unused when `block` is a deposit block.
    pub proof: MerkleProof,
}

impl IncludedTransaction {
    #[must_use]
    pub fn new(tx: SignedTransaction, block: BlockNumber, proof: MerkleProof) -> Self {
        Self { tx, block, proof }
    }

    #[must_use]
    pub fn slot(&self) -> Slot {
        self.tx.tx.slot
    }

    /// Check the transaction is committed in `block`.
    ///
    /// A deposit block commits its transaction directly as the root; an
    /// operator block commits it as the leaf at `slot`.
    ///
    /// # Errors
    /// - `UnknownBlock` if `block` was never committed
    /// - `InvalidProof` if the transaction is not in the block
    pub fn verify_inclusion(&self, blocks: &BlockStore) -> Result<()> {
        let block = blocks
            .get(self.block)
            .ok_or(PlasmaError::UnknownBlock(self.block))?;
        let leaf = self.tx.hash();
        let included = match block.kind {
            BlockKind::Deposit => block.root == leaf,
            BlockKind::Operator => self.proof.verify(self.slot(), &leaf, &block.root),
        };
        if !included {
            tracing::warn!(
                slot = %self.slot(),
                block = %self.block,
                "Inclusion proof rejected"
            );
            return Err(PlasmaError::InvalidProof {
                slot: self.slot(),
                block: self.block,
            });
        }
        Ok(())
    }
}

/// Where the exiting transaction's sender got the coin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// The deposit self-transfer, committed as the deposit block root.
    Genesis(Transaction),
    /// An ordinary transfer in an operator block.
    Transfer(IncludedTransaction),
}

/// What an exitor proves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitClaim {
    /// Exit straight from the deposit. Only the depositor may file it.
    Deposit,
    /// Exit with the latest transfer and the one before it.
    Transfer {
        exiting: IncludedTransaction,
        prior: Provenance,
    },
}

/// Facts an accepted claim establishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedHistory {
    /// Recipient of the exiting transaction.
    pub owner: Address,
    /// Signer of the exiting transaction.
    pub prev_owner: Address,
    /// Block of the prior transaction. Null for a deposit exit.
    pub prior_block: BlockNumber,
    /// Block of the exiting transaction.
    pub exit_block: BlockNumber,
}

/// Check that `claimant` holds `coin` according to `claim`.
///
/// # Errors
/// - `NotOwner` if the claimant is not the recipient of the exiting transaction
/// - `InvalidExit` if a transaction belongs to another coin
/// - `BrokenHistory` if the two transactions do not link
/// - `UnknownBlock` / `InvalidProof` if an inclusion fails
pub fn verify_history(
    blocks: &BlockStore,
    coin: &Coin,
    claimant: &Address,
    claim: &ExitClaim,
) -> Result<VerifiedHistory> {
    match claim {
        ExitClaim::Deposit => verify_deposit_exit(blocks, coin, claimant),
        ExitClaim::Transfer { exiting, prior } => {
            verify_transfer_exit(blocks, coin, claimant, exiting, prior)
        }
    }
}

fn verify_deposit_exit(
    blocks: &BlockStore,
    coin: &Coin,
    claimant: &Address,
) -> Result<VerifiedHistory> {
    if coin.owner != *claimant {
        return Err(PlasmaError::NotOwner {
            slot: coin.slot,
            caller: *claimant,
        });
    }
    verify_genesis(blocks, coin, &Transaction::deposit(coin.slot, *claimant, coin.denomination))?;
    Ok(VerifiedHistory {
        owner: *claimant,
        prev_owner: *claimant,
        prior_block: BlockNumber::NULL,
        exit_block: coin.deposit_block,
    })
}

fn verify_transfer_exit(
    blocks: &BlockStore,
    coin: &Coin,
    claimant: &Address,
    exiting: &IncludedTransaction,
    prior: &Provenance,
) -> Result<VerifiedHistory> {
    let exiting_tx = &exiting.tx.tx;
    check_same_coin(coin, exiting_tx)?;
    if exiting_tx.new_owner != *claimant {
        return Err(PlasmaError::NotOwner {
            slot: coin.slot,
            caller: *claimant,
        });
    }

    let (prior_tx, prior_block) = match prior {
        Provenance::Genesis(tx) => {
            check_same_coin(coin, tx)?;
            verify_genesis(blocks, coin, tx)?;
            (tx, coin.deposit_block)
        }
        Provenance::Transfer(included) => {
            check_same_coin(coin, &included.tx.tx)?;
            let is_operator_block = blocks
                .get(included.block)
                .ok_or(PlasmaError::UnknownBlock(included.block))?
                .kind
                == BlockKind::Operator;
            if !is_operator_block {
                return Err(PlasmaError::BrokenHistory {
                    reason: format!(
                        "prior transfer in deposit {}; use the genesis provenance",
                        included.block
                    ),
                });
            }
            included.verify_inclusion(blocks)?;
            (&included.tx.tx, included.block)
        }
    };

    if exiting.block <= prior_block {
        return Err(PlasmaError::BrokenHistory {
            reason: format!(
                "exiting {} is not after prior {prior_block}",
                exiting.block
            ),
        });
    }
    if exiting_tx.prev_block != prior_block {
        return Err(PlasmaError::BrokenHistory {
            reason: format!(
                "exiting transaction spends {}, prior is in {prior_block}",
                exiting_tx.prev_block
            ),
        });
    }
    exiting.verify_inclusion(blocks)?;

    let prev_owner = prior_tx.new_owner;
    exiting
        .tx
        .verify_signer(&prev_owner)
        .map_err(|e| PlasmaError::BrokenHistory {
            reason: format!("exiting transaction not signed by prior owner: {e}"),
        })?;

    Ok(VerifiedHistory {
        owner: *claimant,
        prev_owner,
        prior_block,
        exit_block: exiting.block,
    })
}

fn check_same_coin(coin: &Coin, tx: &Transaction) -> Result<()> {
    if tx.slot != coin.slot {
        return Err(PlasmaError::InvalidExit {
            reason: format!("transaction moves {}, not {}", tx.slot, coin.slot),
        });
    }
    if tx.denomination != coin.denomination {
        return Err(PlasmaError::InvalidExit {
            reason: format!(
                "denomination {} does not match coin denomination {}",
                tx.denomination, coin.denomination
            ),
        });
    }
    Ok(())
}

fn verify_genesis(blocks: &BlockStore, coin: &Coin, tx: &Transaction) -> Result<()> {
    let root = blocks.root(coin.deposit_block)?;
    if !tx.is_deposit() || tx.hash() != root {
        tracing::warn!(
            slot = %coin.slot,
            block = %coin.deposit_block,
            "Deposit commitment mismatch"
        );
        return Err(PlasmaError::InvalidProof {
            slot: coin.slot,
            block: coin.deposit_block,
        });
    }
    Ok(())
}
