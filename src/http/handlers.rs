//! API route handlers.
//!
//! Handlers only translate between HTTP and `OnboardingService`; every
//! decision about wallets and profiles is made there.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::advisory::AirQuality;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::ledger::Ledger;
use crate::onboarding::{Dashboard, OnboardingState, Submission};
use crate::profile::HealthProfile;
use crate::wallet::{CurrentUser, WalletSummary};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionResponse {
    #[serde(flatten)]
    pub wallet: WalletSummary,
    pub created: bool,
}

/// Run a wallet-store call on the blocking pool; file media write synchronously.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!(error = %e, "Wallet storage task failed");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Wallet storage task failed",
        )
    })?
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn provision_wallet<L: Ledger>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
) -> Result<(StatusCode, Json<ProvisionResponse>), ApiError> {
    let service = state.service.clone();
    let provisioned = blocking(move || Ok(service.provision(&user)?)).await?;
    let status = if provisioned.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(ProvisionResponse {
            wallet: provisioned.wallet.summary(),
            created: provisioned.created,
        }),
    ))
}

pub async fn get_wallet<L: Ledger>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
) -> Result<Json<WalletSummary>, ApiError> {
    state
        .service
        .wallet(&user)
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "no_wallet", "No wallet for this user"))
}

pub async fn delete_wallet<L: Ledger>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
) -> Result<StatusCode, ApiError> {
    let service = state.service.clone();
    blocking(move || Ok(service.reset_wallet(&user)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn dashboard<L: Ledger>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
) -> Json<Dashboard> {
    Json(state.service.dashboard(&user).await)
}

pub async fn onboarding<L: Ledger>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
) -> Result<Json<OnboardingState>, ApiError> {
    Ok(Json(state.service.onboarding_state(&user).await?))
}

pub async fn get_profile<L: Ledger>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
) -> Result<Json<HealthProfile>, ApiError> {
    Ok(Json(state.service.get_profile(&user).await?))
}

pub async fn profile_exists<L: Ledger>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let exists = state.service.has_profile(&user).await?;
    Ok(Json(json!({ "hasProfile": exists })))
}

pub async fn submit_profile<L: Ledger>(
    State(state): State<AppState<L>>,
    user: CurrentUser,
    body: Result<Json<HealthProfile>, JsonRejection>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    let Json(profile) =
        body.map_err(|e| ApiError::new(e.status(), "invalid_body", e.body_text()))?;
    let submission = state.service.submit(&user, profile).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

pub async fn air_quality<L: Ledger>(State(state): State<AppState<L>>) -> Json<AirQuality> {
    Json(state.service.air_quality().await)
}
