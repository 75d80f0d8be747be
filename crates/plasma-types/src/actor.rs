//! Keyed test participants.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

use crate::{Address, SignedTransaction, Transaction};

/// A named participant with an ed25519 key.
#[derive(Debug, Clone)]
pub struct Actor {
    pub name: &'static str,
    pub key: SigningKey,
}

impl Actor {
    /// Deterministic actor derived from a one-byte seed.
    #[must_use]
    pub fn new(name: &'static str, seed: u8) -> Self {
        Self {
            name,
            key: SigningKey::from_bytes(&[seed; 32]),
        }
    }

    /// Actor with a fresh random key.
    #[must_use]
    pub fn random(name: &'static str) -> Self {
        Self {
            name,
            key: SigningKey::generate(&mut OsRng),
        }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        Address::from(self.key.verifying_key())
    }

    #[must_use]
    pub fn sign(&self, tx: Transaction) -> SignedTransaction {
        tx.sign(&self.key)
    }
}
