//! JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::onboarding::OnboardingError;
use crate::profile::QueryError;

/// Error body: `{"error": {"code", "message", "details"?}}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }
}

impl From<OnboardingError> for ApiError {
    fn from(err: OnboardingError) -> Self {
        let message = err.to_string();
        match err {
            OnboardingError::NoWallet => Self::new(StatusCode::CONFLICT, "no_wallet", message),
            OnboardingError::Invalid(fields) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: "validation_failed",
                message,
                details: Some(json!(fields)),
            },
            OnboardingError::Storage(_) => {
                tracing::error!(error = %message, "Wallet storage failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message)
            }
            OnboardingError::Submit(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "transaction_failed", message)
            }
            OnboardingError::Query(QueryError::Absent) => {
                Self::new(StatusCode::NOT_FOUND, "profile_absent", message)
            }
            OnboardingError::Query(_) => Self::new(StatusCode::BAD_GATEWAY, "ledger_error", message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error = json!({
            "code": self.code,
            "message": self.message,
        });
        if let Some(details) = self.details {
            error["details"] = details;
        }
        (self.status, Json(json!({ "error": error }))).into_response()
    }
}
