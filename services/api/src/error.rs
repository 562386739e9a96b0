//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service. Handlers return these; the
/// boundary turns each kind into a status code and an `{"error": …}` body.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Business-rule conflict (duplicate username, already friends, …)
    #[error("{0}")]
    Conflict(String),

    /// Missing, invalid, or mismatched credentials/token
    #[error("{0}")]
    Unauthorized(String),

    /// Acting on someone else's resource
    #[error("{0}")]
    Forbidden(String),

    /// The session's cached presence flag says offline
    #[error("You are offline. Community features are not available.")]
    Offline,

    /// Unknown user/product/request
    #[error("{0}")]
    NotFound(String),

    /// Per-endpoint quota exceeded
    #[error("Too many requests")]
    RateLimited,

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl ApiError {
    /// Log an unexpected error and collapse it to the generic 500.
    pub fn internal(err: anyhow::Error) -> Self {
        tracing::error!("Unexpected error: {:#}", err);
        ApiError::InternalServerError
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Offline => (StatusCode::FORBIDDEN, ApiError::Offline.to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::RateLimited => {
                (StatusCode::TOO_MANY_REQUESTS, "Too many requests".to_string())
            }
            // Internal detail stays in the logs, never in the response.
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
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

    fn status_of(error: ApiError) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn error_kinds_map_to_the_documented_status_codes() {
        assert_eq!(
            status_of(ApiError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Conflict("dup".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Unauthorized("nope".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ApiError::Forbidden("denied".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(ApiError::Offline), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(ApiError::NotFound("gone".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(ApiError::InternalServerError),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
