//! Exit bond accounting types.
//!
//! A bond is `escrowed` while the exit it backs is pending. When the exit
//! finalizes the bond returns to the exitor; when a challenge is upheld it
//! goes to the challenger. Either way it becomes `withdrawable`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bond holdings of a single account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BondBalance {
    /// Locked behind pending exits.
    pub escrowed: Decimal,
    /// Released or slashed to this account, awaiting `withdraw_bonds`.
    pub withdrawable: Decimal,
}

impl BondBalance {
    /// Create a zero balance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            escrowed: Decimal::ZERO,
            withdrawable: Decimal::ZERO,
        }
    }

    /// Total held for this account (escrowed + withdrawable).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.escrowed + self.withdrawable
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.escrowed.is_zero() && self.withdrawable.is_zero()
    }
}

impl Default for BondBalance {
    fn default() -> Self {
        Self::new()
    }
}
