//! # Coin: one deposited non-fungible asset
//!
//! ## State Machine
//!
//! ```text
//!   ┌───────────┐  exit filed   ┌─────────┐  finalized   ┌────────┐
//!   │ DEPOSITED ├──────────────▶│ EXITING ├─────────────▶│ EXITED │
//!   └───────────┘               └────┬────┘              └────────┘
//!         ▲                          │ challenge upheld
//!         └──────────────────────────┘
//! ```
//!
//! `EXITED` is terminal: no further exits, transfers or challenges.
//! A slot with no coin record reports `DEPOSITED`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, AssetId, BlockNumber, PlasmaError, Result, Slot};

/// The lifecycle state of a coin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoinState {
    /// Held on the child chain. Eligible for an exit.
    #[default]
    Deposited,
    /// An exit is pending.
    Exiting,
    /// Exit finalized. Only the exit owner may withdraw the asset.
    Exited,
}

impl CoinState {
    /// Can the coin move to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Deposited, Self::Exiting)
                | (Self::Exiting, Self::Exited | Self::Deposited)
        )
    }

    /// Numeric code of the state: 0 deposited, 1 exiting, 2 exited.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::Deposited => 0,
            Self::Exiting => 1,
            Self::Exited => 2,
        }
    }
}

impl std::fmt::Display for CoinState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposited => write!(f, "DEPOSITED"),
            Self::Exiting => write!(f, "EXITING"),
            Self::Exited => write!(f, "EXITED"),
        }
    }
}

/// The root chain's record of a deposited coin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    /// Globally unique slot, never reused.
    pub slot: Slot,
    /// The asset inside its registry.
    pub asset_id: AssetId,
    /// The registry that reported the deposit. Withdrawal goes back through it.
    pub registry: Address,
    /// Value of the coin.
    pub denomination: u64,
    /// Depositor until an exit finalizes, then the exit owner.
    pub owner: Address,
    /// The deposit block committing the coin's self-transfer.
    pub deposit_block: BlockNumber,
    /// Current lifecycle state.
    pub state: CoinState,
    /// Set once the asset has been paid out of an `Exited` coin.
    pub withdrawn_at: Option<DateTime<Utc>>,
}

impl Coin {
    fn transition(&mut self, target: CoinState) -> Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(PlasmaError::InvalidCoinTransition {
                slot: self.slot,
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        Ok(())
    }

    /// Transition to EXITING.
    ///
    /// # Errors
    /// Returns error if current state is not Deposited.
    pub fn mark_exiting(&mut self) -> Result<()> {
        self.transition(CoinState::Exiting)
    }

    /// Transition to EXITED and record the exit owner as the coin owner.
    ///
    /// # Errors
    /// Returns error if current state is not Exiting.
    pub fn mark_exited(&mut self, owner: Address) -> Result<()> {
        self.transition(CoinState::Exited)?;
        self.owner = owner;
        Ok(())
    }

    /// Transition back to DEPOSITED after an upheld challenge.
    ///
    /// # Errors
    /// Returns error if current state is not Exiting.
    pub fn reset_to_deposited(&mut self) -> Result<()> {
        self.transition(CoinState::Deposited)
    }

    /// Whether the underlying asset has already been paid out.
    #[must_use]
    pub fn is_withdrawn(&self) -> bool {
        self.withdrawn_at.is_some()
    }
}
