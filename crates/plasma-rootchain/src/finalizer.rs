//! Priority-ordered finalization of matured exits.
//!
//! Finalizing is safe to call at any time. An exit that has not reached
//! `exitable_at` is reported as [`FinalizeOutcome::NotMatured`] and left
//! untouched. Batched finalization isolates every slot: one slot's failure
//! never aborts the rest of the batch.

use chrono::{DateTime, Utc};
use plasma_types::{Address, MaturityPhase, Result, Slot};
use rust_decimal::Decimal;

use crate::coin_registry::CoinRegistry;
use crate::exit_game::{ExitGame, ensure_exiting};

/// What finalizing one slot did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    /// The coin is now Exited and the bond withdrawable by `owner`.
    Finalized { owner: Address, bond: Decimal },
    /// Still inside its maturity period. Nothing changed.
    NotMatured {
        phase: MaturityPhase,
        exitable_at: DateTime<Utc>,
    },
    /// The slot has no pending exit.
    NoPendingExit,
}

impl FinalizeOutcome {
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        matches!(self, Self::Finalized { .. })
    }
}

/// Result of one slot within a batch.
#[derive(Debug)]
pub struct SlotOutcome {
    pub slot: Slot,
    pub result: Result<FinalizeOutcome>,
}

impl ExitGame {
    /// Finalize the pending exit for `slot` if it has matured.
    ///
    /// # Errors
    /// Only on internal inconsistency between the coin and its exit.
    pub fn finalize_exit(
        &mut self,
        coins: &mut CoinRegistry,
        slot: Slot,
        now: DateTime<Utc>,
    ) -> Result<FinalizeOutcome> {
        let Ok(exit) = self.pending(slot) else {
            return Ok(FinalizeOutcome::NoPendingExit);
        };
        let phase = exit.phase(now);
        if phase != MaturityPhase::Matured {
            tracing::debug!(
                slot = %slot,
                phase = %phase,
                exitable_at = %exit.exitable_at,
                "Exit not matured, finalization skipped"
            );
            return Ok(FinalizeOutcome::NotMatured {
                phase,
                exitable_at: exit.exitable_at,
            });
        }
        let (owner, bond) = (exit.owner, exit.bond);

        ensure_exiting(coins, slot)?;
        self.bonds.release(owner, bond)?;
        coins.mark_exited(slot, owner)?;
        self.queue.remove(slot);
        if let Some(exit) = self.exits.get_mut(&slot) {
            exit.mark_finalized()?;
        }

        tracing::info!(
            slot = %slot,
            owner = %owner,
            bond = %bond,
            "Exit finalized"
        );
        Ok(FinalizeOutcome::Finalized { owner, bond })
    }

    /// Finalize a batch of slots.
    ///
    /// Slots with a pending exit run first, in priority order; the others
    /// follow in the order given. Every requested slot gets an outcome.
    pub fn finalize_exits(
        &mut self,
        coins: &mut CoinRegistry,
        slots: &[Slot],
        now: DateTime<Utc>,
    ) -> Vec<SlotOutcome> {
        let (mut queued, rest): (Vec<Slot>, Vec<Slot>) =
            slots.iter().copied().partition(|slot| self.queue.contains(*slot));
        queued.sort_by_key(|slot| self.queue.priority_of(*slot));

        queued
            .into_iter()
            .chain(rest)
            .map(|slot| self.finalize_one(coins, slot, now))
            .collect()
    }

    /// Finalize every matured exit in the queue, in priority order.
    pub fn finalize_matured(
        &mut self,
        coins: &mut CoinRegistry,
        now: DateTime<Utc>,
    ) -> Vec<SlotOutcome> {
        let matured: Vec<Slot> = self
            .queue
            .iter()
            .map(|priority| priority.slot)
            .filter(|slot| self.exits.get(slot).is_some_and(|exit| exit.is_matured(now)))
            .collect();
        tracing::debug!(matured = matured.len(), queued = self.queue.len(), "Sweeping exit queue");

        matured
            .into_iter()
            .map(|slot| self.finalize_one(coins, slot, now))
            .collect()
    }

    fn finalize_one(&mut self, coins: &mut CoinRegistry, slot: Slot, now: DateTime<Utc>) -> SlotOutcome {
        let result = self.finalize_exit(coins, slot, now);
        if let Err(e) = &result {
            tracing::warn!(slot = %slot, error = %e, "Finalization failed");
        }
        SlotOutcome { slot, result }
    }
}
