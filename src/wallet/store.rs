//! Per-user wallet records on a local medium.
//!
//! # Responsibilities
//! - Create, load, and remove the record for a stable user identifier
//! - Delete any record that fails the shape invariant when it is read
//! - Serialize provisioning so each identifier gets at most one wallet
//!
//! # Design Decisions
//! - A corrupted record is never returned; reading it removes it
//! - Provisioning is create-or-fetch under a per-key lock: the first
//!   writer wins and later callers get the stored wallet
//! - Media without durable storage make `persist` a no-op, not an error

use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::observability::metrics;
use crate::wallet::identity::StableUserId;
use crate::wallet::storage::{KeyValueStore, StorageError, StorageResult};
use crate::wallet::types::Wallet;

/// Default key prefix for wallet records.
pub const DEFAULT_NAMESPACE: &str = "aptos_wallet";

/// Result of `WalletStore::get_or_create`.
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub wallet: Wallet,
    /// `true` when this call generated the wallet.
    pub created: bool,
}

/// Owner of the local wallet records.
pub struct WalletStore {
    storage: Arc<dyn KeyValueStore>,
    namespace: String,
    provisioning: DashMap<String, Arc<Mutex<()>>>,
}

impl WalletStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
            provisioning: DashMap::new(),
        }
    }

    /// Storage key for one user's record.
    pub fn key_for(&self, user: &StableUserId) -> String {
        format!("{}_{}", self.namespace, user)
    }

    /// A fresh wallet. Not persisted.
    pub fn generate() -> Wallet {
        Wallet::generate()
    }

    /// Write `wallet` under the user's key.
    pub fn persist(&self, wallet: &Wallet, user: &StableUserId) -> StorageResult<()> {
        if !self.storage.is_available() {
            tracing::debug!(user = %user, "No storage medium; wallet not persisted");
            return Ok(());
        }

        let key = self.key_for(user);
        self.storage.set(&key, wallet.encode()?)?;
        tracing::info!(user = %user, address = %wallet.address, "Wallet stored");
        Ok(())
    }

    /// Read the user's record. A corrupted record is removed and reported as absent.
    pub fn load(&self, user: &StableUserId) -> Option<Wallet> {
        let key = self.key_for(user);
        let raw = match self.storage.get(&key) {
            Some(raw) => raw,
            None => {
                tracing::debug!(user = %user, "No wallet found");
                return None;
            }
        };

        match Wallet::decode(&raw) {
            Ok(wallet) => {
                tracing::debug!(user = %user, address = %wallet.address, "Wallet retrieved");
                Some(wallet)
            }
            Err(reason) => {
                tracing::error!(user = %user, reason = %reason, "Invalid wallet record; clearing");
                self.remove_corrupted(&key);
                None
            }
        }
    }

    /// Validate the user's record, removing it if corrupted.
    ///
    /// Returns `true` exactly when a record existed and was invalid.
    pub fn detect_and_clear_corruption(&self, user: &StableUserId) -> bool {
        let key = self.key_for(user);
        let Some(raw) = self.storage.get(&key) else {
            return false;
        };

        match Wallet::decode(&raw) {
            Ok(_) => false,
            Err(reason) => {
                tracing::warn!(user = %user, reason = %reason, "Clearing corrupted wallet");
                self.remove_corrupted(&key);
                true
            }
        }
    }

    fn remove_corrupted(&self, key: &str) {
        metrics::record_wallet_event("corrupted");
        if let Err(e) = self.storage.remove(key) {
            tracing::error!(key = %key, error = %e, "Failed to remove corrupted wallet record");
        }
    }

    /// Remove the user's record unconditionally.
    pub fn clear(&self, user: &StableUserId) -> StorageResult<()> {
        self.storage.remove(&self.key_for(user))?;
        metrics::record_wallet_event("cleared");
        tracing::info!(user = %user, "Wallet cleared");
        Ok(())
    }

    /// Remove every record under the namespace. Returns how many were removed.
    pub fn clear_all(&self) -> StorageResult<usize> {
        let mut removed = 0;
        for key in self.storage.keys() {
            if self.owns(&key) {
                self.storage.remove(&key)?;
                removed += 1;
            }
        }
        tracing::info!(removed = removed, "All wallets cleared from storage");
        Ok(removed)
    }

    /// Number of records under the namespace.
    pub fn count(&self) -> usize {
        self.storage
            .keys()
            .iter()
            .filter(|key| self.owns(key))
            .count()
    }

    fn owns(&self, key: &str) -> bool {
        key == self.namespace
            || key
                .strip_prefix(self.namespace.as_str())
                .is_some_and(|rest| rest.starts_with('_'))
    }

    /// `true` iff `load` would return a wallet.
    pub fn exists(&self, user: &StableUserId) -> bool {
        self.load(user).is_some()
    }

    /// Return the user's wallet, generating and persisting one if none exists.
    pub fn get_or_create(&self, user: &StableUserId) -> Result<Provisioned, StorageError> {
        let key = self.key_for(user);
        let lock = self.provisioning.entry(key.clone()).or_default().clone();
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.load_or_generate(user)
        };

        // Only the map and this call hold the lock: no one else is waiting.
        self.provisioning.remove_if(&key, |_, held| {
            Arc::ptr_eq(held, &lock) && Arc::strong_count(held) == 2
        });
        result
    }

    fn load_or_generate(&self, user: &StableUserId) -> Result<Provisioned, StorageError> {
        if let Some(wallet) = self.load(user) {
            metrics::record_wallet_event("loaded");
            return Ok(Provisioned {
                wallet,
                created: false,
            });
        }

        let wallet = Self::generate();
        self.persist(&wallet, user)?;
        metrics::record_wallet_event("created");
        tracing::info!(user = %user, address = %wallet.address, "Wallet provisioned");

        Ok(Provisioned {
            wallet,
            created: true,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl std::fmt::Debug for WalletStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletStore")
            .field("namespace", &self.namespace)
            .field("available", &self.storage.is_available())
            .finish()
    }
}
