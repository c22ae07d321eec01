use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Profile(e) => {
                let status = match e {
                    ProfileError::ManualLimitReached { .. } | ProfileError::AlreadyManual(_) => {
                        StatusCode::CONFLICT
                    }
                    ProfileError::NotManual(_) => StatusCode::NOT_FOUND,
                    ProfileError::EmptyKeyword => StatusCode::BAD_REQUEST,
                };
                (status, "PROFILE_ERROR", e.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Invalid learning constants. Fatal at startup, never raised per call.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key}: could not parse '{value}'")]
    Parse { key: &'static str, value: String },

    #[error("{key}: {reason}")]
    Invalid {
        key: &'static str,
        reason: &'static str,
    },
}

impl ConfigError {
    pub fn invalid(key: &'static str, reason: &'static str) -> Self {
        ConfigError::Invalid { key, reason }
    }
}

/// Rejected user-initiated keyword edits.
#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("Keyword is empty after normalization")]
    EmptyKeyword,

    #[error("Manual keyword limit of {limit} reached")]
    ManualLimitReached { limit: usize },

    #[error("'{0}' is already a manual keyword")]
    AlreadyManual(String),

    #[error("'{0}' is not a manual keyword")]
    NotManual(String),
}
