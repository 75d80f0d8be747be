//! Coin registry: slot allocation and the per-coin state machine.
//!
//! Owns every [`Coin`] record. Slots are derived from the depositing
//! registry, the depositor, the asset and a per-registry deposit counter,
//! and are never reused: coin records are kept after withdrawal.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use plasma_types::{Address, AssetId, Coin, CoinState, PlasmaError, Result, Slot};

/// Manages the coin lifecycle: allocation, state transitions, payout.
#[derive(Debug, Default)]
pub struct CoinRegistry {
    coins: HashMap<Slot, Coin>,
    /// Deposits seen per asset registry.
    nonces: HashMap<Address, u64>,
}

impl CoinRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot the next deposit from `registry` would receive.
    ///
    /// # Errors
    /// Returns `SlotCollision` if the derived slot is already allocated.
    pub fn reserve_slot(
        &self,
        registry: &Address,
        depositor: &Address,
        asset_id: AssetId,
    ) -> Result<Slot> {
        let nonce = self.nonces.get(registry).copied().unwrap_or(0);
        let slot = Slot::derive(registry, depositor, asset_id, nonce);
        if self.coins.contains_key(&slot) {
            return Err(PlasmaError::SlotCollision(slot));
        }
        Ok(slot)
    }

    /// Record a freshly deposited coin.
    ///
    /// # Errors
    /// Returns `SlotCollision` if the slot is already allocated.
    pub fn insert(&mut self, coin: Coin) -> Result<()> {
        if self.coins.contains_key(&coin.slot) {
            return Err(PlasmaError::SlotCollision(coin.slot));
        }
        *self.nonces.entry(coin.registry).or_insert(0) += 1;
        self.coins.insert(coin.slot, coin);
        Ok(())
    }

    /// # Errors
    /// Returns `CoinNotFound` for an unknown slot.
    pub fn get(&self, slot: Slot) -> Result<&Coin> {
        self.coins.get(&slot).ok_or(PlasmaError::CoinNotFound(slot))
    }

    fn get_mut(&mut self, slot: Slot) -> Result<&mut Coin> {
        self.coins
            .get_mut(&slot)
            .ok_or(PlasmaError::CoinNotFound(slot))
    }

    /// State of the coin at `slot`. Unknown slots report `Deposited`.
    #[must_use]
    pub fn state(&self, slot: Slot) -> CoinState {
        self.coins
            .get(&slot)
            .map(|coin| coin.state)
            .unwrap_or_default()
    }

    /// Deposited → Exiting.
    pub fn mark_exiting(&mut self, slot: Slot) -> Result<()> {
        self.get_mut(slot)?.mark_exiting()
    }

    /// Exiting → Exited, recording the exit owner.
    pub fn mark_exited(&mut self, slot: Slot, owner: Address) -> Result<()> {
        self.get_mut(slot)?.mark_exited(owner)
    }

    /// Exiting → Deposited.
    pub fn reset_to_deposited(&mut self, slot: Slot) -> Result<()> {
        self.get_mut(slot)?.reset_to_deposited()
    }

    /// Record the one-time payout of an exited coin.
    ///
    /// # Errors
    /// - `NotExited` unless the coin is Exited
    /// - `AlreadyWithdrawn` on a second payout
    pub fn mark_withdrawn(&mut self, slot: Slot, now: DateTime<Utc>) -> Result<()> {
        let coin = self.get_mut(slot)?;
        if coin.state != CoinState::Exited {
            return Err(PlasmaError::NotExited {
                slot,
                state: coin.state,
            });
        }
        if coin.is_withdrawn() {
            return Err(PlasmaError::AlreadyWithdrawn(slot));
        }
        coin.withdrawn_at = Some(now);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use plasma_types::BlockNumber;

    use super::*;

    const REGISTRY: Address = Address([9; 32]);
    const ALICE: Address = Address([1; 32]);

    fn deposit(registry: &mut CoinRegistry, asset: u64) -> Slot {
        let slot = registry.reserve_slot(&REGISTRY, &ALICE, AssetId(asset)).unwrap();
        registry
            .insert(Coin {
                slot,
                asset_id: AssetId(asset),
                registry: REGISTRY,
                denomination: 1,
                owner: ALICE,
                deposit_block: BlockNumber(1),
                state: CoinState::Deposited,
                withdrawn_at: None,
            })
            .unwrap();
        slot
    }

    #[test]
    fn unknown_slot_reports_deposited() {
        let registry = CoinRegistry::new();
        assert_eq!(registry.state(Slot(77)), CoinState::Deposited);
        assert!(matches!(
            registry.get(Slot(77)).unwrap_err(),
            PlasmaError::CoinNotFound(_)
        ));
    }

    #[test]
    fn redeposit_of_same_asset_gets_fresh_slot() {
        let mut registry = CoinRegistry::new();
        let first = deposit(&mut registry, 5);
        let second = deposit(&mut registry, 5);
        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn duplicate_insert_collides() {
        let mut registry = CoinRegistry::new();
        let slot = deposit(&mut registry, 1);
        let coin = registry.get(slot).unwrap().clone();
        let err = registry.insert(coin).unwrap_err();
        assert!(matches!(err, PlasmaError::SlotCollision(_)));
    }

    #[test]
    fn lifecycle_through_withdrawal() {
        let mut registry = CoinRegistry::new();
        let slot = deposit(&mut registry, 1);
        let bob = Address([2; 32]);
        registry.mark_exiting(slot).unwrap();
        assert_eq!(registry.state(slot), CoinState::Exiting);
        registry.mark_exited(slot, bob).unwrap();
        assert_eq!(registry.get(slot).unwrap().owner, bob);

        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        registry.mark_withdrawn(slot, now).unwrap();
        let err = registry.mark_withdrawn(slot, now).unwrap_err();
        assert!(matches!(err, PlasmaError::AlreadyWithdrawn(_)));
    }

    #[test]
    fn withdraw_requires_exited() {
        let mut registry = CoinRegistry::new();
        let slot = deposit(&mut registry, 1);
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let err = registry.mark_withdrawn(slot, now).unwrap_err();
        assert!(matches!(
            err,
            PlasmaError::NotExited {
                state: CoinState::Deposited,
                ..
            }
        ));
    }

    #[test]
    fn reset_after_challenge() {
        let mut registry = CoinRegistry::new();
        let slot = deposit(&mut registry, 1);
        registry.mark_exiting(slot).unwrap();
        registry.reset_to_deposited(slot).unwrap();
        assert_eq!(registry.state(slot), CoinState::Deposited);
    }
}
