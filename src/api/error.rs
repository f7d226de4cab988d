//! Error type shared by all API handlers
//!
//! | Variant | HTTP Status |
//! |---------|-------------|
//! | Validation | 400 |
//! | NotFound | 404 |
//! | Conflict | 409 |
//! | Upstream(NotFound) | 404 |
//! | Upstream(Status) | 502 |
//! | Internal | 500 |
//!
//! Every error renders as `{"error": "<message>"}`.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::core::{ValidationError, VerseError};
use crate::plugins::EnrichmentError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The (group, song) pair is already taken
    #[error("{0}")]
    Conflict(String),

    /// The song details API refused the lookup
    #[error(transparent)]
    Upstream(#[from] EnrichmentError),

    /// Storage or other unexpected failure; details are only logged
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<VerseError> for ApiError {
    fn from(err: VerseError) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(EnrichmentError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Upstream(EnrichmentError::Status(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(err) = self {
            error!("Request failed: {:#}", err);
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
