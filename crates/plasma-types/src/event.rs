//! Events emitted by the root chain.
//!
//! Every state-changing call appends zero or more events to the root chain's
//! log. Off-chain watchers replay the log to track deposits and exits they
//! may need to challenge.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, AssetId, BlockNumber, Hash, Slot};

/// One entry in the root chain's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootChainEvent {
    /// A coin was minted into a fresh deposit block.
    Deposit {
        slot: Slot,
        block_number: BlockNumber,
        denomination: u64,
        from: Address,
        registry: Address,
        asset_id: AssetId,
    },
    /// The operator committed a block root.
    SubmittedBlock { block_number: BlockNumber, root: Hash },
    /// An exit was filed and its bond escrowed.
    StartedExit { slot: Slot, owner: Address },
    /// A challenge was upheld and the exit cancelled.
    ChallengedExit { slot: Slot, challenger: Address },
    /// A matured exit was finalized.
    FinalizedExit { slot: Slot, owner: Address },
    /// The underlying asset left the root chain.
    Withdrew {
        slot: Slot,
        owner: Address,
        registry: Address,
        asset_id: AssetId,
    },
    /// Bond balance paid out.
    WithdrewBonds { from: Address, amount: Decimal },
}

impl RootChainEvent {
    /// Upper snake-case name of the event kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "DEPOSIT",
            Self::SubmittedBlock { .. } => "SUBMITTED_BLOCK",
            Self::StartedExit { .. } => "STARTED_EXIT",
            Self::ChallengedExit { .. } => "CHALLENGED_EXIT",
            Self::FinalizedExit { .. } => "FINALIZED_EXIT",
            Self::Withdrew { .. } => "WITHDREW",
            Self::WithdrewBonds { .. } => "WITHDREW_BONDS",
        }
    }

    /// The slot the event concerns, if any.
    #[must_use]
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Self::Deposit { slot, .. }
            | Self::StartedExit { slot, .. }
            | Self::ChallengedExit { slot, .. }
            | Self::FinalizedExit { slot, .. }
            | Self::Withdrew { slot, .. } => Some(*slot),
            Self::SubmittedBlock { .. } | Self::WithdrewBonds { .. } => None,
        }
    }
}

impl std::fmt::Display for RootChainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slot() {
            Some(slot) => write!(f, "{} {slot}", self.kind()),
            None => write!(f, "{}", self.kind()),
        }
    }
}
