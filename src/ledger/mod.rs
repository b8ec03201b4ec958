//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Wallet record (private key string)
//!     → account.rs (key decoding, address derivation, signing)
//!     → client.rs (REST calls with timeouts)
//!     → node: encode_submission → submit → by_hash polling, or view
//! ```
//!
//! # Security Constraints
//! - Never log private keys or signing messages
//! - All node calls have configurable timeouts
//! - Node error messages are carried verbatim for the read-path classifier

pub mod account;
pub mod client;
pub mod types;

pub use account::Account;
pub use client::{AptosClient, Ledger, LedgerInfo};
pub use types::{
    AccountAddress, CommittedTransaction, Ed25519Authenticator, EntryFunctionPayload, FunctionId,
    KeyError, LedgerError, LedgerResult, ModuleId, PendingTransaction, UserTransactionRequest,
    ViewRequest,
};
