//! Wallet lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! Identity provider user
//!     → identity.rs (stable user identifier: email, else subject id)
//!     → store.rs (create-or-fetch, delete-on-read validation)
//!     → storage.rs (injected medium: memory, file, or none)
//! ```
//!
//! # Security Constraints
//! - Private keys stay in the record; logs carry address and user key only

pub mod identity;
pub mod storage;
pub mod store;
pub mod types;

pub use identity::{CurrentUser, StableUserId};
pub use storage::{FileStore, KeyValueStore, MemoryStore, NullStore, StorageError, StorageResult};
pub use store::{Provisioned, WalletStore, DEFAULT_NAMESPACE};
pub use types::{Corruption, Wallet, WalletSummary};
