//! # plasma-rootchain
//!
//! **Settlement layer** of a Plasma Cash chain: the root chain that holds
//! deposited assets, accepts block commitments from the operator and runs
//! the exit game that lets owners take their coins back.
//!
//! ## Components
//!
//! 1. **BlockStore**: operator block roots and deposit blocks, strictly ordered
//! 2. **CoinRegistry**: one record per deposited coin with its state machine
//! 3. **History verification**: checks a claimed chain of custody against
//!    committed roots with sparse Merkle proofs
//! 4. **ExitGame**: exit filing, challenges and the bond ledger
//! 5. **Finalizer**: matured exits in priority order
//! 6. **RootChain**: the facade every external call goes through
//!
//! ## Exit Flow
//!
//! ```text
//! deposit ─▶ start_exit ─▶ (challenge window) ─▶ (observation window) ─▶ finalize ─▶ withdraw
//!                 │                 │                      │
//!                 │                 └──── challenge ───────┘
//!                 ▼                              │
//!           bond escrowed            bond slashed, coin DEPOSITED again
//! ```
//!
//! Every call either commits all of its effects or fails with none.

pub mod block_store;
pub mod bond_conservation;
pub mod bond_ledger;
pub mod coin_registry;
pub mod collaborators;
pub mod exit_game;
pub mod exit_queue;
pub mod finalizer;
pub mod history;
pub mod root_chain;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use block_store::{Block, BlockKind, BlockStore};
pub use bond_conservation::BondConservation;
pub use bond_ledger::BondLedger;
pub use coin_registry::CoinRegistry;
pub use collaborators::{AllowList, AssetRegistry, ValidatorSet};
pub use exit_game::ExitGame;
pub use exit_queue::ExitQueue;
pub use finalizer::{FinalizeOutcome, SlotOutcome};
pub use history::{ExitClaim, IncludedTransaction, Provenance, VerifiedHistory, verify_history};
pub use root_chain::{CallContext, RootChain};
