//! Error types for the Plasma Cash root chain.
//!
//! All errors use the `PC_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Block store errors
//! - 2xx: Proof / signature errors
//! - 3xx: Ownership history / exit validity errors
//! - 4xx: Coin / deposit errors
//! - 5xx: Exit, challenge and bond errors
//! - 6xx: Withdrawal errors
//! - 7xx: Collaborator errors
//! - 8xx: Invariant violations
//! - 9xx: General / internal errors

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Address, BlockNumber, CoinState, ExitState, Slot};

/// Central error enum for all root chain operations.
#[derive(Debug, Error)]
pub enum PlasmaError {
    // =================================================================
    // Block Store Errors (1xx)
    // =================================================================
    /// A block was submitted below the current maximum block number.
    #[error("PC_ERR_100: Stale block {number}: current block is {current}")]
    StaleBlock {
        number: BlockNumber,
        current: BlockNumber,
    },

    /// A proof or lookup referenced a block that was never committed.
    #[error("PC_ERR_101: Unknown block: {0}")]
    UnknownBlock(BlockNumber),

    /// The caller is not an authorized block submitter.
    #[error("PC_ERR_102: Unauthorized block submitter: {0}")]
    UnauthorizedSubmitter(Address),

    /// An operator block tried to overwrite a deposit block.
    #[error("PC_ERR_103: Cannot overwrite deposit block {0}")]
    DepositBlockOverwrite(BlockNumber),

    /// No block number is left above the current block.
    #[error("PC_ERR_104: Block numbers exhausted at {0}")]
    BlockNumberOverflow(BlockNumber),

    // =================================================================
    // Proof / Signature Errors (2xx)
    // =================================================================
    /// The Merkle proof does not connect the leaf to the committed root.
    #[error("PC_ERR_200: Invalid inclusion proof for {slot} in {block}")]
    InvalidProof { slot: Slot, block: BlockNumber },

    /// The proof bytes could not be decoded.
    #[error("PC_ERR_201: Malformed proof: {reason}")]
    MalformedProof { reason: String },

    /// An ed25519 signature failed to decode or verify.
    #[error("PC_ERR_202: Invalid signature: {reason}")]
    InvalidSignature { reason: String },

    /// Two leaves were supplied for the same slot of one tree.
    #[error("PC_ERR_203: Duplicate leaf for {0}")]
    DuplicateLeaf(Slot),

    // =================================================================
    // History / Exit Validity Errors (3xx)
    // =================================================================
    /// The prior/exiting transaction pair does not form a valid chain of custody.
    #[error("PC_ERR_300: Broken ownership history: {reason}")]
    BrokenHistory { reason: String },

    /// The exit request is invalid for a reason not covered by a specific code.
    #[error("PC_ERR_301: Invalid exit: {reason}")]
    InvalidExit { reason: String },

    // =================================================================
    // Coin / Deposit Errors (4xx)
    // =================================================================
    /// No coin has been deposited at this slot.
    #[error("PC_ERR_400: Coin not found: {0}")]
    CoinNotFound(Slot),

    /// The coin state machine does not allow this transition.
    #[error("PC_ERR_401: Cannot transition {slot} from {from} to {to}")]
    InvalidCoinTransition {
        slot: Slot,
        from: CoinState,
        to: CoinState,
    },

    /// Slot derivation produced a slot that is already allocated.
    #[error("PC_ERR_402: Slot collision: {0}")]
    SlotCollision(Slot),

    /// A deposit notification came from an address that is not an allowed registry.
    #[error("PC_ERR_403: Unauthorized asset registry: {0}")]
    UnauthorizedRegistry(Address),

    // =================================================================
    // Exit / Challenge / Bond Errors (5xx)
    // =================================================================
    /// The caller is not the owner required for this step.
    #[error("PC_ERR_500: {caller} is not the owner of {slot}")]
    NotOwner { slot: Slot, caller: Address },

    /// The slot already has a pending exit.
    #[error("PC_ERR_501: Coin already exiting: {0}")]
    AlreadyExiting(Slot),

    /// The posted bond does not equal the required exit bond.
    #[error("PC_ERR_502: Insufficient bond: required {required}, posted {posted}")]
    InsufficientBond { required: Decimal, posted: Decimal },

    /// The exit has not yet reached the end of its maturity period.
    #[error("PC_ERR_503: Exit not matured for {slot}: exitable at {exitable_at}")]
    NotMatured {
        slot: Slot,
        exitable_at: DateTime<Utc>,
    },

    /// No pending exit exists for the slot.
    #[error("PC_ERR_504: No pending exit for {0}")]
    ExitNotFound(Slot),

    /// The challenge does not invalidate the exit.
    #[error("PC_ERR_505: Invalid challenge: {reason}")]
    InvalidChallenge { reason: String },

    /// The exit state machine does not allow this transition.
    #[error("PC_ERR_506: Cannot transition exit for {slot} from {from} to {to}")]
    InvalidExitTransition {
        slot: Slot,
        from: ExitState,
        to: ExitState,
    },

    /// The account has no withdrawable bond balance.
    #[error("PC_ERR_507: Nothing to withdraw for {0}")]
    NothingToWithdraw(Address),

    // =================================================================
    // Withdrawal Errors (6xx)
    // =================================================================
    /// The coin has not completed its exit.
    #[error("PC_ERR_600: Coin not exited: {slot} is {state}")]
    NotExited { slot: Slot, state: CoinState },

    /// The withdrawal went through a registry that did not originate the deposit.
    #[error("PC_ERR_601: Wrong registry for {slot}: deposited via {expected}, got {actual}")]
    WrongRegistry {
        slot: Slot,
        expected: Address,
        actual: Address,
    },

    /// The coin was already paid out.
    #[error("PC_ERR_602: Coin already withdrawn: {0}")]
    AlreadyWithdrawn(Slot),

    // =================================================================
    // Collaborator Errors (7xx)
    // =================================================================
    /// The asset registry refused to move the underlying asset.
    #[error("PC_ERR_700: Asset transfer failed: {reason}")]
    AssetTransferFailed { reason: String },

    /// A call observed a clock earlier than one already committed.
    #[error("PC_ERR_701: Clock regression: {now} is before {last}")]
    ClockRegression {
        now: DateTime<Utc>,
        last: DateTime<Utc>,
    },

    // =================================================================
    // Invariant Violations (8xx)
    // =================================================================
    /// Bond conservation invariant violated. Critical safety alert.
    #[error("PC_ERR_800: Bond invariant violation: {reason}")]
    BondInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("PC_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("PC_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("PC_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PlasmaError>;

impl From<serde_json::Error> for PlasmaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
