//! Wallet record and its stored encoding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::ledger::{Account, KeyError};

/// A signing identity and its derived address, as stored locally.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub address: String,
    pub private_key: String,
    pub public_key: String,
}

impl Wallet {
    /// Fresh keypair and derived address.
    pub fn generate() -> Self {
        Self::from(&Account::generate())
    }

    /// All three fields present and non-empty.
    pub fn is_valid(&self) -> bool {
        !self.address.is_empty() && !self.private_key.is_empty() && !self.public_key.is_empty()
    }

    /// Rebuild the signing identity from the stored private key.
    pub fn account(&self) -> Result<Account, KeyError> {
        Account::from_private_key(&self.private_key)
    }

    /// Public view of the wallet.
    pub fn summary(&self) -> WalletSummary {
        WalletSummary {
            address: self.address.clone(),
            public_key: self.public_key.clone(),
        }
    }

    /// Encode for storage.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a stored record, enforcing the shape invariant.
    pub fn decode(raw: &str) -> Result<Self, Corruption> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| Corruption::Malformed(e.to_string()))?;
        let object = value.as_object().ok_or(Corruption::NotAnObject)?;

        Ok(Self {
            address: required(object, "address")?,
            private_key: required(object, "privateKey")?,
            public_key: required(object, "publicKey")?,
        })
    }
}

fn required(object: &Map<String, Value>, field: &'static str) -> Result<String, Corruption> {
    match object.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(Corruption::MissingField(field)),
    }
}

impl From<&Account> for Wallet {
    fn from(account: &Account) -> Self {
        Self {
            address: account.address().to_string(),
            private_key: account.private_key_hex(),
            public_key: account.public_key_hex(),
        }
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Wallet fields safe to show a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub address: String,
    pub public_key: String,
}

/// Why a stored record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Corruption {
    #[error("record is not valid JSON: {0}")]
    Malformed(String),

    #[error("record is not an object")]
    NotAnObject,

    #[error("record is missing `{0}`")]
    MissingField(&'static str),
}
