//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service.
///
/// Every variant is recoverable at the request boundary; repeating a failed
/// call yields the same deterministic error.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Referenced entity absent, or not owned by the requesting user
    #[error("Resource not found")]
    NotFound,

    /// Missing or invalid bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Non-coordinator attempting a coordinator-only operation, or a
    /// coordinator attempting to demote themselves
    #[error("Permission denied")]
    PermissionDenied,

    /// An active signup already exists for this (user, event) pair
    #[error("You are already signed up for this event")]
    AlreadySignedUp,

    /// The event has reached its confirmed-signup capacity
    #[error("This event is full")]
    EventFull,

    /// Hours can only be logged against scheduled events
    #[error("You can only log work for scheduled events")]
    EventNotScheduled,

    /// Non-coordinators must hold a confirmed signup to log event hours
    #[error("You must be signed up for this event")]
    NotSignedUp,

    /// Operation attempted from a state that forbids it
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed input
    #[error("{0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Whether a sqlx error is a PostgreSQL unique constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::AlreadySignedUp | ApiError::EventFull | ApiError::InvalidState(_) => {
                StatusCode::CONFLICT
            }
            ApiError::EventNotScheduled | ApiError::NotSignedUp | ApiError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match &self {
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
                "Internal server error".to_string()
            }
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::PermissionDenied.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::EventFull.status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::AlreadySignedUp.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::InvalidState("already reviewed".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::NotSignedUp.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Validation("hours must be positive".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
