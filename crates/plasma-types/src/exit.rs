//! Exit records and the maturity timeline.
//!
//! An exit filed at `t0` moves through three non-overlapping phases:
//! **CHALLENGE_WINDOW → OBSERVATION_WINDOW → MATURED**
//!
//! - `[t0, t0 + t1)`: challenge window.
//! - `[t0 + t1, t0 + t1 + t2)`: observation window. Still open to challenges,
//!   finalization remains a no-op.
//! - `[t0 + t1 + t2, ∞)`: matured. The exit can be finalized.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, BlockNumber, PlasmaError, Result, Slot};

/// Lifecycle of one exit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitState {
    /// Filed, bond escrowed, waiting out the maturity period.
    Pending,
    /// Invalidated by a challenge. Bond went to the challenger.
    Challenged,
    /// Matured unchallenged. Bond returned to the owner.
    Finalized,
}

impl ExitState {
    /// Can the exit move to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Challenged | Self::Finalized)
        )
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Challenged => write!(f, "CHALLENGED"),
            Self::Finalized => write!(f, "FINALIZED"),
        }
    }
}

/// Where an exit sits on its maturity timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaturityPhase {
    ChallengeWindow,
    ObservationWindow,
    Matured,
}

impl fmt::Display for MaturityPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChallengeWindow => write!(f, "CHALLENGE_WINDOW"),
            Self::ObservationWindow => write!(f, "OBSERVATION_WINDOW"),
            Self::Matured => write!(f, "MATURED"),
        }
    }
}

/// Finalization ordering key. Smaller sorts first.
///
/// Compared field by field: the block of the exiting transaction first, so
/// an exit backed by older committed history always precedes one backed by
/// a more recent transfer; then the time it becomes exitable; then the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExitPriority {
    pub exit_block: BlockNumber,
    pub exitable_at: DateTime<Utc>,
    pub slot: Slot,
}

impl fmt::Display for ExitPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.exit_block,
            self.exitable_at.timestamp(),
            self.slot
        )
    }
}

/// A bonded claim to withdraw a coin to the root chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitRecord {
    pub slot: Slot,
    /// The exitor: recipient of the exiting transaction.
    pub owner: Address,
    /// Recipient of the prior transaction, who signed the exiting one.
    pub prev_owner: Address,
    /// Block of the prior transaction ([`BlockNumber::NULL`] for a deposit exit).
    pub prior_block: BlockNumber,
    /// Block of the exiting transaction.
    pub exit_block: BlockNumber,
    /// Escrowed bond.
    pub bond: Decimal,
    /// When the exit was filed (`t0`).
    pub filed_at: DateTime<Utc>,
    /// End of the challenge window (`t0 + t1`).
    pub observable_at: DateTime<Utc>,
    /// End of the maturity period (`t0 + t1 + t2`).
    pub exitable_at: DateTime<Utc>,
    pub priority: ExitPriority,
    pub state: ExitState,
}

impl ExitRecord {
    /// Phase of the maturity timeline at `now`.
    #[must_use]
    pub fn phase(&self, now: DateTime<Utc>) -> MaturityPhase {
        if now < self.observable_at {
            MaturityPhase::ChallengeWindow
        } else if now < self.exitable_at {
            MaturityPhase::ObservationWindow
        } else {
            MaturityPhase::Matured
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state == ExitState::Pending
    }

    #[must_use]
    pub fn is_matured(&self, now: DateTime<Utc>) -> bool {
        self.phase(now) == MaturityPhase::Matured
    }

    fn transition(&mut self, target: ExitState) -> Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(PlasmaError::InvalidExitTransition {
                slot: self.slot,
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        Ok(())
    }

    /// # Errors
    /// Returns error if the exit is not Pending.
    pub fn mark_challenged(&mut self) -> Result<()> {
        self.transition(ExitState::Challenged)
    }

    /// # Errors
    /// Returns error if the exit is not Pending.
    pub fn mark_finalized(&mut self) -> Result<()> {
        self.transition(ExitState::Finalized)
    }
}
