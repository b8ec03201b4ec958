//! Ed25519 account keys and transaction signing.
//!
//! # Security
//! - Private keys are never logged; `Debug` prints the address only
//! - Key generation uses the OS random source

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use std::fmt;

use crate::ledger::types::{AccountAddress, Ed25519Authenticator, KeyError};

/// Prefix of the AIP-80 private key encoding.
const AIP80_PREFIX: &str = "ed25519-priv-";

/// A signing identity on the ledger.
#[derive(Clone)]
pub struct Account {
    signing_key: SigningKey,
    address: AccountAddress,
}

impl Account {
    /// Generate a fresh random account.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Rebuild an account from an encoded private key.
    ///
    /// Accepts `0x`-prefixed hex, bare hex, and `ed25519-priv-0x...`.
    pub fn from_private_key(encoded: &str) -> Result<Self, KeyError> {
        let trimmed = encoded.trim();
        let without_scheme = trimmed.strip_prefix(AIP80_PREFIX).unwrap_or(trimmed);
        let digits = without_scheme.strip_prefix("0x").unwrap_or(without_scheme);

        let bytes = hex::decode(digits).map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;
        let seed: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            KeyError::InvalidPrivateKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;

        Ok(Self::from_signing_key(SigningKey::from_bytes(&seed)))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = AccountAddress::from_public_key(&signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            address,
        }
    }

    pub fn address(&self) -> AccountAddress {
        self.address
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.public_key_bytes()))
    }

    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.to_bytes()))
    }

    /// Sign a signing message and package it as a transaction authenticator.
    pub fn sign(&self, message: &[u8]) -> Ed25519Authenticator {
        let signature = self.signing_key.sign(message);
        Ed25519Authenticator {
            public_key: self.public_key_hex(),
            signature: format!("0x{}", hex::encode(signature.to_bytes())),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
