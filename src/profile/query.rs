//! Profile read path.
//!
//! The node's view endpoint has no typed "not found": a missing profile
//! comes back as an error whose text names the condition. `classify` maps
//! ledger errors onto `QueryError` in one place so callers only branch on
//! the variant.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::ledger::{AccountAddress, KeyError, Ledger, LedgerError, ModuleId, ViewRequest};
use crate::observability::metrics;
use crate::profile::types::HealthProfile;
use crate::wallet::Wallet;

/// View returning the positional profile fields.
pub const VIEW_PROFILE: &str = "view_profile";
/// View returning `[bool]`.
pub const HAS_PROFILE: &str = "has_profile";

/// Error texts from the read path that mean "no profile for this address".
/// Matched case-insensitively.
const ABSENCE_SIGNATURES: [&str; 4] = [
    "profile not found",
    "access denied",
    "failed to parse",
    // Public node rate limit ("Per anonymous IP rate limit exceeded").
    "per anonym",
];

/// Outcome of a failed profile read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The ledger holds no profile for this address.
    #[error("Profile not found or access denied")]
    Absent,

    /// The ledger answered with something other than the profile layout.
    #[error("Invalid data structure returned from blockchain: {0}")]
    Shape(String),

    #[error(transparent)]
    Key(#[from] KeyError),

    /// Any other ledger failure.
    #[error("Ledger read failed: {0}")]
    Ledger(String),
}

impl QueryError {
    pub fn is_absent(&self) -> bool {
        matches!(self, QueryError::Absent)
    }
}

impl From<LedgerError> for QueryError {
    fn from(err: LedgerError) -> Self {
        classify(&err)
    }
}

/// Map a ledger read error to absence or a genuine failure.
pub fn classify(err: &LedgerError) -> QueryError {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    if ABSENCE_SIGNATURES.iter().any(|sig| lowered.contains(sig)) {
        QueryError::Absent
    } else {
        QueryError::Ledger(message)
    }
}

/// Reads profile state for a wallet's address.
pub struct ProfileQueryClient<L> {
    ledger: Arc<L>,
    module: ModuleId,
}

impl<L> Clone for ProfileQueryClient<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            module: self.module.clone(),
        }
    }
}

impl<L: Ledger> ProfileQueryClient<L> {
    pub fn new(ledger: Arc<L>, module: ModuleId) -> Self {
        Self { ledger, module }
    }

    /// Current profile for the wallet's address.
    pub async fn get_profile(&self, wallet: &Wallet) -> Result<HealthProfile, QueryError> {
        let result = self.fetch_profile(wallet).await;
        metrics::record_profile_query(VIEW_PROFILE, outcome(&result));

        match &result {
            Ok(_) => tracing::debug!(address = %wallet.address, "Profile retrieved"),
            Err(QueryError::Absent) => tracing::debug!(address = %wallet.address, "No profile on ledger"),
            Err(e) => tracing::warn!(address = %wallet.address, error = %e, "Profile read failed"),
        }
        result
    }

    async fn fetch_profile(&self, wallet: &Wallet) -> Result<HealthProfile, QueryError> {
        let address = Self::address_of(wallet)?;
        let values = self.call(VIEW_PROFILE, address).await?;
        HealthProfile::from_view(&values).map_err(QueryError::Shape)
    }

    /// Whether a profile exists. Absence is `Ok(false)`, not an error.
    pub async fn has_profile(&self, wallet: &Wallet) -> Result<bool, QueryError> {
        let result = match self.fetch_has_profile(wallet).await {
            Err(QueryError::Absent) => Ok(false),
            other => other,
        };
        metrics::record_profile_query(
            HAS_PROFILE,
            match &result {
                Ok(true) => "found",
                Ok(false) => "absent",
                Err(_) => "error",
            },
        );

        if let Err(e) = &result {
            tracing::warn!(address = %wallet.address, error = %e, "Profile existence check failed");
        }
        result
    }

    async fn fetch_has_profile(&self, wallet: &Wallet) -> Result<bool, QueryError> {
        let address = Self::address_of(wallet)?;
        let values = self.call(HAS_PROFILE, address).await?;
        match values.first() {
            Some(Value::Bool(exists)) => Ok(*exists),
            Some(other) => Err(QueryError::Shape(format!("expected a boolean, got {}", other))),
            None => Err(QueryError::Shape("empty response".to_string())),
        }
    }

    fn address_of(wallet: &Wallet) -> Result<AccountAddress, QueryError> {
        Ok(wallet.account()?.address())
    }

    async fn call(&self, function: &str, address: AccountAddress) -> Result<Vec<Value>, QueryError> {
        let request = ViewRequest::new(
            self.module.function(function),
            vec![Value::from(address.to_string())],
        );
        match self.ledger.view(&request).await? {
            Value::Array(values) => Ok(values),
            other => Err(QueryError::Shape(format!(
                "expected a sequence of return values, got {}",
                other
            ))),
        }
    }
}

fn outcome<T>(result: &Result<T, QueryError>) -> &'static str {
    match result {
        Ok(_) => "found",
        Err(QueryError::Absent) => "absent",
        Err(_) => "error",
    }
}
