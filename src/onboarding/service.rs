//! User-facing flows over the wallet store and profile clients.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::advisory::{AdviceClient, AirQuality, AirQualityClient};
use crate::ledger::{Ledger, ModuleId};
use crate::profile::{
    FieldError, HealthProfile, ProfileQueryClient, ProfileTransactionClient, QueryError,
    SubmitError,
};
use crate::wallet::{CurrentUser, Provisioned, StorageError, Wallet, WalletStore, WalletSummary};

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("Wallet not found. Please log in again.")]
    NoWallet,

    #[error("Please fill in all required fields.")]
    Invalid(Vec<FieldError>),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Profile state as the dashboard renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProfileState {
    Found { profile: HealthProfile },
    Absent,
    Error { message: String },
    NoWallet,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// A corrupted wallet record was found and removed during this load.
    pub wallet_reset: bool,
    pub wallet: Option<WalletSummary>,
    pub profile: ProfileState,
}

/// Prefill for the onboarding form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingState {
    /// `true` when a profile already exists and the form edits it.
    pub editing: bool,
    pub profile: HealthProfile,
    pub completion_percent: f64,
}

/// Result of a finalized profile submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub transaction_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    pub air_quality: AirQuality,
    /// `None` when the advice endpoint failed.
    pub advice: Option<String>,
}

/// Sign-in, dashboard and onboarding flows for one deployment.
pub struct OnboardingService<L> {
    wallets: Arc<WalletStore>,
    transactions: ProfileTransactionClient<L>,
    queries: ProfileQueryClient<L>,
    air_quality: AirQualityClient,
    advice: AdviceClient,
}

impl<L> Clone for OnboardingService<L> {
    fn clone(&self) -> Self {
        Self {
            wallets: self.wallets.clone(),
            transactions: self.transactions.clone(),
            queries: self.queries.clone(),
            air_quality: self.air_quality.clone(),
            advice: self.advice.clone(),
        }
    }
}

impl<L: Ledger> OnboardingService<L> {
    pub fn new(
        wallets: Arc<WalletStore>,
        ledger: Arc<L>,
        module: ModuleId,
        air_quality: AirQualityClient,
        advice: AdviceClient,
    ) -> Self {
        Self {
            wallets,
            transactions: ProfileTransactionClient::new(ledger.clone(), module.clone()),
            queries: ProfileQueryClient::new(ledger, module),
            air_quality,
            advice,
        }
    }

    pub fn wallets(&self) -> &WalletStore {
        &self.wallets
    }

    /// Sign-in: the user's wallet, created on first call.
    pub fn provision(&self, user: &CurrentUser) -> Result<Provisioned, OnboardingError> {
        Ok(self.wallets.get_or_create(&user.stable_id())?)
    }

    pub fn wallet(&self, user: &CurrentUser) -> Option<WalletSummary> {
        self.wallets.load(&user.stable_id()).map(|w| w.summary())
    }

    pub fn reset_wallet(&self, user: &CurrentUser) -> Result<(), OnboardingError> {
        Ok(self.wallets.clear(&user.stable_id())?)
    }

    fn require_wallet(&self, user: &CurrentUser) -> Result<Wallet, OnboardingError> {
        self.wallets
            .load(&user.stable_id())
            .ok_or(OnboardingError::NoWallet)
    }

    pub async fn dashboard(&self, user: &CurrentUser) -> Dashboard {
        let id = user.stable_id();
        let wallet_reset = self.wallets.detect_and_clear_corruption(&id);
        if wallet_reset {
            tracing::warn!(user = %id, "Wallet record was corrupted and has been reset");
        }

        let Some(wallet) = self.wallets.load(&id) else {
            return Dashboard {
                wallet_reset,
                wallet: None,
                profile: ProfileState::NoWallet,
            };
        };

        let profile = match self.queries.get_profile(&wallet).await {
            Ok(profile) => ProfileState::Found { profile },
            Err(QueryError::Absent) => ProfileState::Absent,
            Err(e) => ProfileState::Error {
                message: e.to_string(),
            },
        };

        Dashboard {
            wallet_reset,
            wallet: Some(wallet.summary()),
            profile,
        }
    }

    pub async fn onboarding_state(
        &self,
        user: &CurrentUser,
    ) -> Result<OnboardingState, OnboardingError> {
        let wallet = self.require_wallet(user)?;

        let (editing, profile) = match self.queries.get_profile(&wallet).await {
            Ok(profile) => (true, profile),
            Err(e) => {
                if !e.is_absent() {
                    tracing::info!(error = %e, "Profile unavailable; starting new submission");
                }
                (false, HealthProfile::default())
            }
        };

        Ok(OnboardingState {
            editing,
            completion_percent: profile.completion_percent(),
            profile,
        })
    }

    pub async fn get_profile(&self, user: &CurrentUser) -> Result<HealthProfile, OnboardingError> {
        let wallet = self.require_wallet(user)?;
        Ok(self.queries.get_profile(&wallet).await?)
    }

    pub async fn has_profile(&self, user: &CurrentUser) -> Result<bool, OnboardingError> {
        let wallet = self.require_wallet(user)?;
        Ok(self.queries.has_profile(&wallet).await?)
    }

    /// Validate, write the profile, then gather air quality and advice.
    pub async fn submit(
        &self,
        user: &CurrentUser,
        profile: HealthProfile,
    ) -> Result<Submission, OnboardingError> {
        let wallet = self.require_wallet(user)?;
        profile.validate().map_err(OnboardingError::Invalid)?;

        let receipt = self.transactions.submit(&wallet, &profile).await?;

        let air_quality = self.air_quality.current().await;
        let advice = match self.advice.advise(&profile, &air_quality).await {
            Ok(advice) => Some(advice),
            Err(e) => {
                tracing::warn!(tx_hash = %receipt.transaction_hash, error = %e, "Advice unavailable");
                None
            }
        };

        Ok(Submission {
            transaction_hash: receipt.transaction_hash,
            version: receipt.version,
            air_quality,
            advice,
        })
    }

    pub async fn air_quality(&self) -> AirQuality {
        self.air_quality.current().await
    }
}
