//! Per-account exit bond accounting.
//!
//! Every mutation is atomic: the operation either fully applies or the
//! balances are unchanged.

use std::collections::HashMap;

use plasma_types::{Address, BondBalance, PlasmaError, Result};
use rust_decimal::Decimal;

use crate::bond_conservation::BondConservation;

/// Escrowed and withdrawable bond balances for every account.
#[derive(Debug, Default)]
pub struct BondLedger {
    balances: HashMap<Address, BondBalance>,
    conservation: BondConservation,
}

impl BondLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock a freshly posted bond behind `owner`'s exit.
    pub fn escrow(&mut self, owner: Address, amount: Decimal) {
        self.balances.entry(owner).or_default().escrowed += amount;
        self.conservation.record_posted(amount);
    }

    /// Return an escrowed bond to its owner (escrowed → withdrawable).
    ///
    /// # Errors
    /// Returns `BondInvariantViolation` if less than `amount` is escrowed.
    pub fn release(&mut self, owner: Address, amount: Decimal) -> Result<()> {
        let entry = self.escrowed_entry(owner, amount)?;
        entry.escrowed -= amount;
        entry.withdrawable += amount;
        Ok(())
    }

    /// Forfeit `owner`'s escrowed bond to `challenger`.
    ///
    /// # Errors
    /// Returns `BondInvariantViolation` if less than `amount` is escrowed.
    pub fn slash(&mut self, owner: Address, challenger: Address, amount: Decimal) -> Result<()> {
        self.escrowed_entry(owner, amount)?.escrowed -= amount;
        self.balances.entry(challenger).or_default().withdrawable += amount;
        Ok(())
    }

    fn escrowed_entry(&mut self, owner: Address, amount: Decimal) -> Result<&mut BondBalance> {
        let entry = self
            .balances
            .get_mut(&owner)
            .filter(|entry| entry.escrowed >= amount)
            .ok_or_else(|| PlasmaError::BondInvariantViolation {
                reason: format!("{owner} has less than {amount} escrowed"),
            })?;
        Ok(entry)
    }

    /// Pay out the account's whole withdrawable balance and zero it.
    ///
    /// # Errors
    /// - `NothingToWithdraw` if the balance is zero
    /// - `BondInvariantViolation` if the payout breaks conservation
    pub fn withdraw_all(&mut self, account: Address) -> Result<Decimal> {
        let amount = self
            .balances
            .get(&account)
            .map_or(Decimal::ZERO, |entry| entry.withdrawable);
        if amount.is_zero() {
            return Err(PlasmaError::NothingToWithdraw(account));
        }
        let mut conservation = self.conservation.clone();
        conservation.record_paid(amount);
        conservation.verify(self.total_held() - amount)?;

        if let Some(entry) = self.balances.get_mut(&account) {
            entry.withdrawable = Decimal::ZERO;
        }
        self.conservation = conservation;
        Ok(amount)
    }

    #[must_use]
    pub fn balance(&self, account: &Address) -> BondBalance {
        self.balances.get(account).cloned().unwrap_or_default()
    }

    /// Sum of every account's escrowed and withdrawable bonds.
    #[must_use]
    pub fn total_held(&self) -> Decimal {
        self.balances.values().map(BondBalance::total).sum()
    }

    /// # Errors
    /// Returns `BondInvariantViolation` if held bonds do not match
    /// posted minus paid.
    pub fn verify_conservation(&self) -> Result<()> {
        self.conservation.verify(self.total_held())
    }

    #[must_use]
    pub fn conservation(&self) -> &BondConservation {
        &self.conservation
    }
}
