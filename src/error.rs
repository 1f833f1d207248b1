//! Crate-wide error type
//!
//! Every fallible path surfaces an `AppError`; the `IntoResponse` impl
//! turns it into the JSON error body and status code the HTTP layer
//! emits. Failures are terminal per request, nothing here retries.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// All failure modes of the crate.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Authentication required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Capability token malformed or signature mismatch (400)
    #[error("Invalid token")]
    InvalidToken,

    /// Requested moderation status outside the allowed set (401)
    #[error("Invalid moderation status")]
    InvalidStatus,

    /// Moderation state machine rejected the move (401)
    #[error("Invalid status transition")]
    InvalidTransition,

    /// Weight calculator invoked with zero total duration (500)
    ///
    /// The export path short-circuits an empty asset set before the
    /// calculator runs, so reaching this from HTTP is a caller bug.
    #[error("Schedule has no qualifying screen time")]
    EmptySchedule,

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// `InvalidStatus` and `InvalidTransition` map to 401, which is what
    /// the display network's existing moderation tooling expects.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message, error_type) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string(), "not_found"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), "unauthorized"),
            AppError::InvalidToken => (StatusCode::BAD_REQUEST, self.to_string(), "invalid_token"),
            AppError::InvalidStatus => {
                (StatusCode::UNAUTHORIZED, self.to_string(), "invalid_status")
            }
            AppError::InvalidTransition => (
                StatusCode::UNAUTHORIZED,
                self.to_string(),
                "invalid_transition",
            ),
            AppError::EmptySchedule => (
                StatusCode::INTERNAL_SERVER_ERROR,
                self.to_string(),
                "empty_schedule",
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "validation"),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                "database",
            ),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "config"),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "internal",
            ),
        };

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Shorthand for fallible operations across the crate.
pub type Result<T> = std::result::Result<T, AppError>;
