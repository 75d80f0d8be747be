//! Block store: the append-only log of committed child-chain roots.
//!
//! Block numbers never go backwards. The operator may resubmit the current
//! highest block to correct a mistaken publish, but a deposit block is never
//! overwritten and nothing is ever inserted below the current maximum.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use plasma_types::{BlockNumber, Hash, PlasmaError, Result};
use serde::{Deserialize, Serialize};

/// Who produced a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Minted by the root chain for a single deposit. Root is the deposit
    /// transaction hash.
    Deposit,
    /// Submitted by the operator. Root is a sparse Merkle root.
    Operator,
}

/// A committed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub number: BlockNumber,
    pub root: Hash,
    pub kind: BlockKind,
    pub committed_at: DateTime<Utc>,
}

/// Committed roots indexed by block number.
#[derive(Debug, Default)]
pub struct BlockStore {
    blocks: BTreeMap<BlockNumber, Block>,
}

impl BlockStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest committed block number ([`BlockNumber::NULL`] when empty).
    #[must_use]
    pub fn current(&self) -> BlockNumber {
        self.blocks
            .last_key_value()
            .map_or(BlockNumber::NULL, |(number, _)| *number)
    }

    /// Commit an operator block.
    ///
    /// # Errors
    /// - `StaleBlock` if `number` is null or below the current maximum
    /// - `DepositBlockOverwrite` if `number` is the current block and it is
    ///   a deposit block
    pub fn submit(&mut self, number: BlockNumber, root: Hash, now: DateTime<Utc>) -> Result<()> {
        let current = self.current();
        if number.is_null() || number < current {
            return Err(PlasmaError::StaleBlock { number, current });
        }
        if self
            .blocks
            .get(&number)
            .is_some_and(|existing| existing.kind == BlockKind::Deposit)
        {
            return Err(PlasmaError::DepositBlockOverwrite(number));
        }
        self.blocks.insert(
            number,
            Block {
                number,
                root,
                kind: BlockKind::Operator,
                committed_at: now,
            },
        );
        Ok(())
    }

    /// Mint the next block for a deposit. Returns its number.
    ///
    /// # Errors
    /// Returns `BlockNumberOverflow` if the current block is `u64::MAX`.
    pub fn append_deposit(&mut self, root: Hash, now: DateTime<Utc>) -> Result<BlockNumber> {
        let current = self.current();
        let number = current
            .checked_next()
            .ok_or(PlasmaError::BlockNumberOverflow(current))?;
        self.blocks.insert(
            number,
            Block {
                number,
                root,
                kind: BlockKind::Deposit,
                committed_at: now,
            },
        );
        Ok(number)
    }

    /// Root committed at `number`.
    ///
    /// # Errors
    /// Returns `UnknownBlock` if nothing was committed there.
    pub fn root(&self, number: BlockNumber) -> Result<Hash> {
        self.get(number)
            .map(|block| block.root)
            .ok_or(PlasmaError::UnknownBlock(number))
    }

    #[must_use]
    pub fn get(&self, number: BlockNumber) -> Option<&Block> {
        self.blocks.get(&number)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
