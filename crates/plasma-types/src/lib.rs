//! # plasma-types
//!
//! Shared types, errors, and configuration for the **Plasma Cash** root chain.
//!
//! This crate is the leaf dependency of the workspace. Every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`Slot`], [`BlockNumber`], [`AssetId`], [`Hash`]
//! - **Off-ledger transactions**: [`Transaction`], [`SignedTransaction`]
//! - **Coin model**: [`Coin`], [`CoinState`]
//! - **Exit model**: [`ExitRecord`], [`ExitState`], [`ExitPriority`], [`MaturityPhase`]
//! - **Bond model**: [`BondBalance`]
//! - **Events**: [`RootChainEvent`]
//! - **Configuration**: [`RootChainConfig`], [`ExitGameConfig`]
//! - **Errors**: [`PlasmaError`] with `PC_ERR_` prefix codes
//! - **Constants**: protocol parameters and defaults

pub mod bond;
pub mod coin;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod exit;
pub mod ids;
pub mod transaction;

#[cfg(any(test, feature = "test-helpers"))]
pub mod actor;

// Re-export all primary types at crate root for ergonomic imports:
//   use plasma_types::{Coin, CoinState, Slot, Transaction, ...};

pub use bond::*;
pub use coin::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use exit::*;
pub use ids::*;
pub use transaction::*;

#[cfg(any(test, feature = "test-helpers"))]
pub use actor::Actor;

// Constants are accessed via `plasma_types::constants::FOO`
// (not re-exported to avoid name collisions).
