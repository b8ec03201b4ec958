//! Operator endpoints behind a bearer API key.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Json,
};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::ledger::Ledger;
use crate::onboarding::OnboardingError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub ledger_reachable: bool,
    pub wallet_namespace: String,
    pub wallet_count: usize,
}

#[derive(Serialize)]
pub struct ClearedWallets {
    pub removed: usize,
}

pub async fn admin_auth<L: Ledger>(
    State(state): State<AppState<L>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = format!("Bearer {}", state.admin_key);
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if presented == Some(expected.as_str()) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(path = %request.uri().path(), "Rejected admin request");
        Err(ApiError::unauthorized("Invalid admin API key"))
    }
}

pub async fn get_status<L: Ledger>(State(state): State<AppState<L>>) -> Json<SystemStatus> {
    let wallets = state.service.wallets();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started.elapsed().as_secs(),
        ledger_reachable: state.ledger.is_healthy().await,
        wallet_namespace: wallets.namespace().to_string(),
        wallet_count: wallets.count(),
    })
}

pub async fn clear_wallets<L: Ledger>(
    State(state): State<AppState<L>>,
) -> Result<Json<ClearedWallets>, ApiError> {
    let removed = state
        .service
        .wallets()
        .clear_all()
        .map_err(|e| ApiError::from(OnboardingError::from(e)))?;
    tracing::warn!(removed = removed, "All wallets cleared by operator");
    Ok(Json(ClearedWallets { removed }))
}
