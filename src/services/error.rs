//! Error handling for the relay pipelines and route handlers

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Every failure a pipeline can hit. All of them reach the caller as a 500.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Access token or access token secret not found for account '{0}'")]
    CredentialNotFound(String),

    #[error("{service} request returned an error: {status} {body}")]
    PublishFailure {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to fetch image from {url}: {reason}")]
    ImageFetch { url: String, reason: String },

    #[error("Failed to upload {key}: {reason}")]
    Storage { key: String, reason: String },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl RelayError {
    pub fn image_fetch(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::ImageFetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn storage(key: &str, reason: impl std::fmt::Display) -> Self {
        Self::Storage {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        tracing::error!(error = %detail, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": detail })),
        )
            .into_response()
    }
}
