//! Interfaces to the systems the root chain depends on but does not own.

use std::collections::HashSet;

use plasma_types::{Address, AssetId, Result};

/// A contract holding the underlying non-fungible assets.
///
/// Deposits are reported by the registry calling
/// [`crate::RootChain::on_deposit`]; withdrawals go back out through
/// [`AssetRegistry::transfer_out`].
pub trait AssetRegistry {
    /// Identity of this registry instance.
    fn address(&self) -> Address;

    /// Move an asset held by the root chain to `to`.
    ///
    /// # Errors
    /// Returns `AssetTransferFailed` if the asset is not in custody.
    fn transfer_out(&mut self, asset_id: AssetId, to: Address) -> Result<()>;

    /// Number of assets owned by `account`.
    fn balance_of(&self, account: &Address) -> u64;
}

/// Membership checks for who may submit blocks and report deposits.
pub trait ValidatorSet {
    fn is_authorized_block_submitter(&self, who: &Address) -> bool;
    fn is_authorized_registry(&self, who: &Address) -> bool;
}

/// In-memory allow-list with toggle semantics.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    submitters: HashSet<Address>,
    registries: HashSet<Address>,
}

impl AllowList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: authorize a block submitter.
    #[must_use]
    pub fn with_submitter(mut self, who: Address) -> Self {
        self.submitters.insert(who);
        self
    }

    /// Builder: authorize an asset registry.
    #[must_use]
    pub fn with_registry(mut self, who: Address) -> Self {
        self.registries.insert(who);
        self
    }

    /// Flip a submitter's authorization. Returns the new status.
    pub fn toggle_submitter(&mut self, who: Address) -> bool {
        toggle(&mut self.submitters, who)
    }

    /// Flip a registry's authorization. Returns the new status.
    pub fn toggle_registry(&mut self, who: Address) -> bool {
        toggle(&mut self.registries, who)
    }
}

fn toggle(set: &mut HashSet<Address>, who: Address) -> bool {
    if set.remove(&who) {
        false
    } else {
        set.insert(who);
        true
    }
}

impl ValidatorSet for AllowList {
    fn is_authorized_block_submitter(&self, who: &Address) -> bool {
        self.submitters.contains(who)
    }

    fn is_authorized_registry(&self, who: &Address) -> bool {
        self.registries.contains(who)
    }
}
