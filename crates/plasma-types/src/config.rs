//! Configuration for a root chain instance and its exit game.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PlasmaError, Result, constants};

/// Exit game parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitGameConfig {
    /// Bond every exit must post, exactly.
    pub exit_bond: Decimal,
    /// First maturity phase (t1). Challenges are expected here.
    pub challenge_period: Duration,
    /// Second maturity phase (t2). Challenges still accepted, no finalization.
    pub maturity_period: Duration,
}

impl Default for ExitGameConfig {
    fn default() -> Self {
        Self {
            exit_bond: Decimal::new(constants::EXIT_BOND_MANTISSA, constants::EXIT_BOND_SCALE),
            challenge_period: Duration::from_secs(constants::DEFAULT_CHALLENGE_PERIOD_SECS),
            maturity_period: Duration::from_secs(constants::DEFAULT_MATURITY_PERIOD_SECS),
        }
    }
}

impl ExitGameConfig {
    /// Total time from filing until an exit can be finalized (t1 + t2).
    #[must_use]
    pub fn total_maturity(&self) -> Duration {
        self.challenge_period + self.maturity_period
    }

    /// The challenge period as a calendar offset.
    ///
    /// # Errors
    /// Returns `Configuration` if the period overflows `chrono::Duration`.
    pub fn challenge_offset(&self) -> Result<chrono::Duration> {
        to_offset("challenge_period", self.challenge_period)
    }

    /// The maturity period as a calendar offset.
    ///
    /// # Errors
    /// Returns `Configuration` if the period overflows `chrono::Duration`.
    pub fn maturity_offset(&self) -> Result<chrono::Duration> {
        to_offset("maturity_period", self.maturity_period)
    }

    /// # Errors
    /// Returns `Configuration` describing the first invalid parameter.
    pub fn validate(&self) -> Result<()> {
        if self.exit_bond <= Decimal::ZERO {
            return Err(PlasmaError::Configuration(format!(
                "exit_bond must be positive, got {}",
                self.exit_bond
            )));
        }
        if self.challenge_period.is_zero() || self.maturity_period.is_zero() {
            return Err(PlasmaError::Configuration(
                "challenge_period and maturity_period must be non-zero".into(),
            ));
        }
        self.challenge_offset()?;
        self.maturity_offset()?;
        Ok(())
    }
}

fn to_offset(name: &str, period: Duration) -> Result<chrono::Duration> {
    chrono::Duration::from_std(period)
        .map_err(|e| PlasmaError::Configuration(format!("{name} out of range: {e}")))
}

/// Configuration for one root chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootChainConfig {
    pub exit: ExitGameConfig,
    /// Value of every deposited coin.
    pub denomination: u64,
}

impl Default for RootChainConfig {
    fn default() -> Self {
        Self {
            exit: ExitGameConfig::default(),
            denomination: constants::COIN_DENOMINATION,
        }
    }
}

impl RootChainConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    /// Returns `Serialization` on malformed JSON, `Configuration` on
    /// invalid parameters.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns `Configuration` describing the first invalid parameter.
    pub fn validate(&self) -> Result<()> {
        if self.denomination == 0 {
            return Err(PlasmaError::Configuration(
                "denomination must be non-zero".into(),
            ));
        }
        self.exit.validate()
    }
}
