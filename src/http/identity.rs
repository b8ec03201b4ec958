//! Authenticated user from gateway headers.
//!
//! The identity provider sits in front of this service and forwards the
//! signed-in user as headers. A request without `x-user-id` is rejected.

use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};

use crate::http::error::ApiError;
use crate::wallet::CurrentUser;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(&parts.headers, USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Sign in required"))?;

        Ok(CurrentUser {
            id,
            email: header(&parts.headers, USER_EMAIL_HEADER),
            name: header(&parts.headers, USER_NAME_HEADER),
        })
    }
}
