//! Bond conservation invariant checker.
//!
//! Checked after every bond payout:
//! ```text
//! Σ(escrowed + withdrawable) == Σ(posted) - Σ(paid out)
//! ```
//!
//! Bonds only move between accounts inside the ledger; slashing and
//! release never create or destroy value.

use plasma_types::{PlasmaError, Result};
use rust_decimal::Decimal;

/// Running totals of bond value entering and leaving the ledger.
#[derive(Debug, Clone, Default)]
pub struct BondConservation {
    posted: Decimal,
    paid: Decimal,
}

impl BondConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_posted(&mut self, amount: Decimal) {
        self.posted += amount;
    }

    pub fn record_paid(&mut self, amount: Decimal) {
        self.paid += amount;
    }

    /// What the ledger should be holding.
    #[must_use]
    pub fn expected_held(&self) -> Decimal {
        self.posted - self.paid
    }

    #[must_use]
    pub fn total_posted(&self) -> Decimal {
        self.posted
    }

    #[must_use]
    pub fn total_paid(&self) -> Decimal {
        self.paid
    }

    /// # Errors
    /// Returns [`PlasmaError::BondInvariantViolation`] if `actual_held`
    /// differs from [`Self::expected_held`].
    pub fn verify(&self, actual_held: Decimal) -> Result<()> {
        let expected = self.expected_held();
        if actual_held != expected {
            return Err(PlasmaError::BondInvariantViolation {
                reason: format!(
                    "held {actual_held} != expected {expected} \
                     (posted={}, paid={})",
                    self.posted, self.paid
                ),
            });
        }
        Ok(())
    }
}
