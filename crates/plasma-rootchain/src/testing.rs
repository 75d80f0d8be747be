//! In-memory collaborators for tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use plasma_types::{Address, AssetId, BlockNumber, PlasmaError, Result, Slot};

use crate::collaborators::{AssetRegistry, ValidatorSet};
use crate::root_chain::{CallContext, RootChain};

/// A minimal non-fungible card registry.
///
/// Depositing moves the card into the root chain's custody and reports the
/// deposit in the same call, reverting the move if the report fails.
#[derive(Debug, Clone)]
pub struct CardRegistry {
    address: Address,
    plasma: Address,
    owners: HashMap<AssetId, Address>,
    next_id: u64,
}

impl CardRegistry {
    #[must_use]
    pub fn new(address: Address, plasma: Address) -> Self {
        Self {
            address,
            plasma,
            owners: HashMap::new(),
            next_id: 1,
        }
    }

    /// Mint `count` cards to `owner`.
    pub fn register(&mut self, owner: Address, count: usize) -> Vec<AssetId> {
        (0..count)
            .map(|_| {
                let id = AssetId(self.next_id);
                self.next_id += 1;
                self.owners.insert(id, owner);
                id
            })
            .collect()
    }

    #[must_use]
    pub fn owner_of(&self, asset_id: AssetId) -> Option<Address> {
        self.owners.get(&asset_id).copied()
    }

    /// Transfer a card to the root chain and report the deposit.
    ///
    /// # Errors
    /// `AssetTransferFailed` if `owner` does not hold the card, or whatever
    /// the root chain returns from `on_deposit`.
    pub fn deposit_to_plasma<V: ValidatorSet>(
        &mut self,
        owner: Address,
        asset_id: AssetId,
        chain: &mut RootChain<V>,
        now: DateTime<Utc>,
    ) -> Result<(Slot, BlockNumber)> {
        if self.owner_of(asset_id) != Some(owner) {
            return Err(PlasmaError::AssetTransferFailed {
                reason: format!("{owner} does not hold {asset_id}"),
            });
        }
        self.owners.insert(asset_id, self.plasma);
        let ctx = CallContext::new(self.address, now);
        chain.on_deposit(ctx, owner, asset_id).inspect_err(|_| {
            self.owners.insert(asset_id, owner);
        })
    }
}

impl AssetRegistry for CardRegistry {
    fn address(&self) -> Address {
        self.address
    }

    fn transfer_out(&mut self, asset_id: AssetId, to: Address) -> Result<()> {
        if self.owner_of(asset_id) != Some(self.plasma) {
            return Err(PlasmaError::AssetTransferFailed {
                reason: format!("{asset_id} is not held by the root chain"),
            });
        }
        self.owners.insert(asset_id, to);
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> u64 {
        self.owners.values().filter(|owner| *owner == account).count() as u64
    }
}
