//! Ledger wire types and error definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha3::{Digest, Sha3_256};
use thiserror::Error;

/// Scheme byte appended to a single Ed25519 public key before hashing.
const ED25519_SCHEME: u8 = 0x00;

/// 32-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountAddress([u8; 32]);

impl AccountAddress {
    pub const LENGTH: usize = 32;

    /// Derive the address of a single-key Ed25519 account.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(public_key);
        hasher.update([ED25519_SCHEME]);
        let digest = hasher.finalize();

        let mut bytes = [0u8; Self::LENGTH];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({})", self)
    }
}

impl FromStr for AccountAddress {
    type Err = KeyError;

    /// Accepts `0x`-prefixed or bare hex, including short forms like `0x1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().strip_prefix("0x").unwrap_or(s.trim());
        if digits.is_empty() || digits.len() > Self::LENGTH * 2 {
            return Err(KeyError::InvalidAddress(s.to_string()));
        }

        let padded = format!("{:0>64}", digits);
        let decoded =
            hex::decode(&padded).map_err(|e| KeyError::InvalidAddress(format!("{}: {}", s, e)))?;

        let mut bytes = [0u8; Self::LENGTH];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

/// Errors raised while decoding key material or addresses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid account address: {0}")]
    InvalidAddress(String),
}

/// Errors that can occur talking to the ledger node.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Connection or protocol failure before a response arrived.
    #[error("Ledger request failed: {0}")]
    Transport(String),

    /// The node answered with a non-success status.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        error_code: Option<String>,
    },

    /// The node answered but the body could not be decoded.
    #[error("Failed to parse ledger response: {0}")]
    Decode(String),

    /// A submitted transaction did not finalize in time.
    #[error("Transaction {hash} not finalized after {timeout_secs} seconds")]
    FinalityTimeout { hash: String, timeout_secs: u64 },

    /// The client was configured with an unusable endpoint.
    #[error("Invalid ledger configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LedgerError::Decode(e.to_string())
        } else {
            LedgerError::Transport(e.to_string())
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// A published Move module, `<address>::<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleId {
    pub address: AccountAddress,
    pub name: String,
}

impl ModuleId {
    pub fn new(address: AccountAddress, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
        }
    }

    /// Locator for one function of this module.
    pub fn function(&self, name: &str) -> FunctionId {
        FunctionId {
            module: self.clone(),
            name: name.to_string(),
        }
    }
}

/// Fully qualified function locator, `<address>::<module>::<function>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionId {
    pub module: ModuleId,
    pub name: String,
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.module.address, self.module.name, self.name)
    }
}

impl Serialize for FunctionId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Entry-function call carried by a write transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "entry_function_payload")]
pub struct EntryFunctionPayload {
    pub function: FunctionId,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

impl EntryFunctionPayload {
    pub fn new(function: FunctionId, arguments: Vec<Value>) -> Self {
        Self {
            function,
            type_arguments: Vec::new(),
            arguments,
        }
    }
}

/// Ed25519 authenticator attached to a submitted transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename = "ed25519_signature")]
pub struct Ed25519Authenticator {
    pub public_key: String,
    pub signature: String,
}

/// User transaction in the node's JSON submission format.
///
/// Integer fields are decimal strings, as the node expects for `u64`.
#[derive(Debug, Clone, Serialize)]
pub struct UserTransactionRequest {
    pub sender: String,
    pub sequence_number: String,
    pub max_gas_amount: String,
    pub gas_unit_price: String,
    pub expiration_timestamp_secs: String,
    pub payload: EntryFunctionPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<Ed25519Authenticator>,
}

impl UserTransactionRequest {
    /// Attach an authenticator, producing the submittable form.
    pub fn with_signature(mut self, signature: Ed25519Authenticator) -> Self {
        self.signature = Some(signature);
        self
    }
}

/// Read-only view call.
#[derive(Debug, Clone, Serialize)]
pub struct ViewRequest {
    pub function: FunctionId,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

impl ViewRequest {
    pub fn new(function: FunctionId, arguments: Vec<Value>) -> Self {
        Self {
            function,
            type_arguments: Vec::new(),
            arguments,
        }
    }
}

/// Acknowledgement for an accepted submission.
#[derive(Debug, Clone, Deserialize)]
pub struct PendingTransaction {
    pub hash: String,
}

/// A transaction the ledger has executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedTransaction {
    pub hash: String,
    pub version: Option<u64>,
    pub success: bool,
    pub vm_status: String,
}
