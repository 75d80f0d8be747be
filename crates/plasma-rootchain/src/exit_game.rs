//! Exit game: exit registration and challenge adjudication.
//!
//! Owns every exit record, the finalization queue and the bond ledger.
//! Each operation runs all of its checks before its first effect, so a
//! rejected call leaves coins, exits and bonds untouched.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use plasma_types::{
    Address, CoinState, ExitGameConfig, ExitPriority, ExitRecord, ExitState, PlasmaError,
    Result, Slot,
};
use rust_decimal::Decimal;

use crate::block_store::BlockStore;
use crate::bond_ledger::BondLedger;
use crate::coin_registry::CoinRegistry;
use crate::exit_queue::ExitQueue;
use crate::history::{ExitClaim, IncludedTransaction, verify_history};

/// Exit records, their priority queue and the bonds behind them.
#[derive(Debug)]
pub struct ExitGame {
    pub(crate) config: ExitGameConfig,
    /// Latest exit record per slot.
    pub(crate) exits: HashMap<Slot, ExitRecord>,
    pub(crate) queue: ExitQueue,
    pub(crate) bonds: BondLedger,
}

impl ExitGame {
    #[must_use]
    pub fn new(config: ExitGameConfig) -> Self {
        Self {
            config,
            exits: HashMap::new(),
            queue: ExitQueue::new(),
            bonds: BondLedger::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ExitGameConfig {
        &self.config
    }

    /// Latest exit record for `slot`, whatever its state.
    #[must_use]
    pub fn exit(&self, slot: Slot) -> Option<&ExitRecord> {
        self.exits.get(&slot)
    }

    /// The pending exit for `slot`.
    ///
    /// # Errors
    /// Returns `ExitNotFound` if the slot has no pending exit.
    pub fn pending(&self, slot: Slot) -> Result<&ExitRecord> {
        self.exits
            .get(&slot)
            .filter(|exit| exit.is_pending())
            .ok_or(PlasmaError::ExitNotFound(slot))
    }

    #[must_use]
    pub fn queue(&self) -> &ExitQueue {
        &self.queue
    }

    #[must_use]
    pub fn bonds(&self) -> &BondLedger {
        &self.bonds
    }

    /// Pay out `account`'s withdrawable bonds.
    pub fn withdraw_bonds(&mut self, account: Address) -> Result<Decimal> {
        self.bonds.withdraw_all(account)
    }

    // =================================================================
    // Registration
    // =================================================================

    /// File an exit for `slot` on behalf of `claimant`.
    ///
    /// # Errors
    /// - `CoinNotFound`, `AlreadyExiting`, `InvalidExit` on coin state
    /// - `InsufficientBond` unless `bond` equals the configured exit bond
    /// - any history verification error
    #[allow(clippy::too_many_arguments)]
    pub fn start_exit(
        &mut self,
        coins: &mut CoinRegistry,
        blocks: &BlockStore,
        claimant: Address,
        slot: Slot,
        claim: &ExitClaim,
        bond: Decimal,
        now: DateTime<Utc>,
    ) -> Result<ExitRecord> {
        let coin = coins.get(slot)?;
        match coin.state {
            CoinState::Exiting => return Err(PlasmaError::AlreadyExiting(slot)),
            CoinState::Exited => {
                return Err(PlasmaError::InvalidExit {
                    reason: format!("{slot} has already exited"),
                });
            }
            CoinState::Deposited => {}
        }
        if self.pending(slot).is_ok() {
            return Err(PlasmaError::AlreadyExiting(slot));
        }
        if bond != self.config.exit_bond {
            return Err(PlasmaError::InsufficientBond {
                required: self.config.exit_bond,
                posted: bond,
            });
        }

        let history = verify_history(blocks, coin, &claimant, claim)?;

        let observable_at = offset(now, self.config.challenge_offset()?)?;
        let exitable_at = offset(observable_at, self.config.maturity_offset()?)?;
        let priority = ExitPriority {
            exit_block: history.exit_block,
            exitable_at,
            slot,
        };
        let record = ExitRecord {
            slot,
            owner: history.owner,
            prev_owner: history.prev_owner,
            prior_block: history.prior_block,
            exit_block: history.exit_block,
            bond,
            filed_at: now,
            observable_at,
            exitable_at,
            priority,
            state: ExitState::Pending,
        };

        coins.mark_exiting(slot)?;
        self.bonds.escrow(record.owner, bond);
        self.queue.insert(priority);
        self.exits.insert(slot, record.clone());

        tracing::info!(
            slot = %slot,
            owner = %record.owner,
            exit_block = %record.exit_block,
            exitable_at = %record.exitable_at,
            "Exit started"
        );
        Ok(record)
    }

    // =================================================================
    // Challenges
    // =================================================================

    /// Cancel an exit by proving the prior owner spent the coin between
    /// the prior and the exiting transaction.
    ///
    /// # Errors
    /// - `ExitNotFound` if no exit is pending
    /// - `InvalidChallenge` if the transaction does not contradict the exit
    /// - `UnknownBlock` / `InvalidProof` if the inclusion fails
    pub fn challenge_between(
        &mut self,
        coins: &mut CoinRegistry,
        blocks: &BlockStore,
        challenger: Address,
        slot: Slot,
        challenge: &IncludedTransaction,
    ) -> Result<ExitRecord> {
        let exit = self.pending(slot)?;
        check_challenge_slot(slot, challenge)?;
        if !(exit.prior_block < challenge.block && challenge.block < exit.exit_block) {
            return Err(PlasmaError::InvalidChallenge {
                reason: format!(
                    "{} is not between {} and {}",
                    challenge.block, exit.prior_block, exit.exit_block
                ),
            });
        }
        check_challenge_signer(challenge, &exit.prev_owner)?;
        challenge.verify_inclusion(blocks)?;
        self.uphold_challenge(coins, slot, challenger)
    }

    /// Cancel an exit by proving the exitor already spent the coin.
    ///
    /// # Errors
    /// - `ExitNotFound` if no exit is pending
    /// - `InvalidChallenge` if the transaction does not spend the exit
    /// - `UnknownBlock` / `InvalidProof` if the inclusion fails
    pub fn challenge_after(
        &mut self,
        coins: &mut CoinRegistry,
        blocks: &BlockStore,
        challenger: Address,
        slot: Slot,
        challenge: &IncludedTransaction,
    ) -> Result<ExitRecord> {
        let exit = self.pending(slot)?;
        check_challenge_slot(slot, challenge)?;
        if challenge.block <= exit.exit_block || challenge.tx.tx.prev_block != exit.exit_block {
            return Err(PlasmaError::InvalidChallenge {
                reason: format!(
                    "transaction in {} spending {} does not spend exit at {}",
                    challenge.block, challenge.tx.tx.prev_block, exit.exit_block
                ),
            });
        }
        check_challenge_signer(challenge, &exit.owner)?;
        challenge.verify_inclusion(blocks)?;
        self.uphold_challenge(coins, slot, challenger)
    }

    fn uphold_challenge(
        &mut self,
        coins: &mut CoinRegistry,
        slot: Slot,
        challenger: Address,
    ) -> Result<ExitRecord> {
        ensure_exiting(coins, slot)?;
        let (owner, bond) = {
            let exit = self.pending(slot)?;
            (exit.owner, exit.bond)
        };

        self.bonds.slash(owner, challenger, bond)?;
        coins.reset_to_deposited(slot)?;
        self.queue.remove(slot);
        let exit = self
            .exits
            .get_mut(&slot)
            .ok_or(PlasmaError::ExitNotFound(slot))?;
        exit.mark_challenged()?;

        tracing::info!(
            slot = %slot,
            owner = %owner,
            challenger = %challenger,
            bond = %bond,
            "Challenge upheld, exit cancelled"
        );
        Ok(exit.clone())
    }
}

/// The coin behind a pending exit must be Exiting.
pub(crate) fn ensure_exiting(coins: &CoinRegistry, slot: Slot) -> Result<()> {
    let state = coins.get(slot)?.state;
    if state != CoinState::Exiting {
        return Err(PlasmaError::Internal(format!(
            "pending exit for {slot} but coin is {state}"
        )));
    }
    Ok(())
}

fn offset(at: DateTime<Utc>, by: chrono::Duration) -> Result<DateTime<Utc>> {
    at.checked_add_signed(by)
        .ok_or_else(|| PlasmaError::Internal(format!("timestamp overflow adding {by} to {at}")))
}

fn check_challenge_slot(slot: Slot, challenge: &IncludedTransaction) -> Result<()> {
    if challenge.slot() != slot {
        return Err(PlasmaError::InvalidChallenge {
            reason: format!("transaction moves {}, not {slot}", challenge.slot()),
        });
    }
    Ok(())
}

fn check_challenge_signer(challenge: &IncludedTransaction, signer: &Address) -> Result<()> {
    challenge
        .tx
        .verify_signer(signer)
        .map_err(|e| PlasmaError::InvalidChallenge {
            reason: e.to_string(),
        })
}
