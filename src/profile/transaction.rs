//! Profile write path.
//!
//! # Responsibilities
//! - Rebuild the signing identity from a stored wallet
//! - Encode the profile as one `set_profile` entry-function call
//! - Sign, submit, and wait for finality before reporting success
//!
//! # Design Decisions
//! - No retries; the caller decides whether to submit again
//! - A transaction the VM executed but rejected is a failure

use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::ledger::{EntryFunctionPayload, KeyError, Ledger, LedgerError, ModuleId};
use crate::observability::metrics;
use crate::profile::types::HealthProfile;
use crate::wallet::Wallet;

/// Entry function that stores a profile for the signer.
pub const SET_PROFILE: &str = "set_profile";

/// Errors from a profile submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Finalized, but the VM reported failure.
    #[error("Transaction {hash} failed: {vm_status}")]
    Aborted { hash: String, vm_status: String },
}

/// A finalized profile write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub transaction_hash: String,
    pub version: Option<u64>,
}

/// Writes profiles to the ledger module.
pub struct ProfileTransactionClient<L> {
    ledger: Arc<L>,
    module: ModuleId,
}

impl<L> Clone for ProfileTransactionClient<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            module: self.module.clone(),
        }
    }
}

impl<L: Ledger> ProfileTransactionClient<L> {
    pub fn new(ledger: Arc<L>, module: ModuleId) -> Self {
        Self { ledger, module }
    }

    /// Sign and submit `profile` with `wallet`, returning once the ledger has finalized it.
    pub async fn submit(
        &self,
        wallet: &Wallet,
        profile: &HealthProfile,
    ) -> Result<SubmitReceipt, SubmitError> {
        let start = Instant::now();
        let result = self.sign_and_submit(wallet, profile).await;

        match &result {
            Ok(receipt) => tracing::info!(
                tx_hash = %receipt.transaction_hash,
                address = %wallet.address,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Profile transaction finalized"
            ),
            Err(e) => tracing::error!(
                address = %wallet.address,
                error = %e,
                "Profile transaction failed"
            ),
        }
        metrics::record_profile_submission(result.is_ok(), start);

        result
    }

    async fn sign_and_submit(
        &self,
        wallet: &Wallet,
        profile: &HealthProfile,
    ) -> Result<SubmitReceipt, SubmitError> {
        let account = wallet.account()?;
        if account.address().to_string() != wallet.address {
            tracing::warn!(
                stored = %wallet.address,
                derived = %account.address(),
                "Stored wallet address does not match its key; using the derived address"
            );
        }

        let payload =
            EntryFunctionPayload::new(self.module.function(SET_PROFILE), profile.to_arguments());
        let unsigned = self.ledger.build_transaction(account.address(), payload).await?;
        let message = self.ledger.signing_message(&unsigned).await?;
        let signed = unsigned.with_signature(account.sign(&message));

        let pending = self.ledger.submit(&signed).await?;
        tracing::debug!(tx_hash = %pending.hash, "Profile transaction submitted");

        let committed = self.ledger.wait_for_transaction(&pending.hash).await?;
        if !committed.success {
            return Err(SubmitError::Aborted {
                hash: committed.hash,
                vm_status: committed.vm_status,
            });
        }

        Ok(SubmitReceipt {
            transaction_hash: committed.hash,
            version: committed.version,
        })
    }
}
