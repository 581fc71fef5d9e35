pub mod accounts;
pub mod articles;
pub mod health;
pub mod webhook;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use std::sync::Arc;

use crate::AppState;
use crate::constants::REQUEST_ID_HEADER;
use crate::services::error::RelayError;

/// Build all routes for the relay
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(webhook::routes())
        .merge(articles::routes())
}

/// Caller-supplied idempotency key, forwarded to outbound create calls
pub(crate) fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Malformed bodies go through the same 500 `{detail}` path as every other failure
pub(crate) fn invalid_payload(rejection: JsonRejection) -> RelayError {
    RelayError::InvalidPayload(rejection.body_text())
}
