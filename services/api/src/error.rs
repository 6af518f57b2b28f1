//! Custom error types for the API service

use auth::{AuthError, validation::FieldError};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request field failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] FieldError),

    /// Request body missing, not JSON, or missing fields
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// Path parameter of the wrong type
    #[error("Invalid path parameter: {0}")]
    InvalidPath(#[from] PathRejection),

    /// Signup with an email that is already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Missing, unknown or expired token, bad credentials, or a vanished user
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but acting on someone else's resource
    #[error("Forbidden")]
    Forbidden,

    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Credential or token issuance error
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Response encoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(field_error) => field_error_body(
                StatusCode::UNPROCESSABLE_ENTITY,
                field_error.field,
                field_error.message,
            ),
            ApiError::InvalidBody(rejection) => {
                field_error_body(rejection.status(), "body", rejection.body_text())
            }
            ApiError::InvalidPath(rejection) => field_error_body(
                StatusCode::UNPROCESSABLE_ENTITY,
                "path",
                rejection.body_text(),
            ),
            ApiError::EmailTaken => {
                error_body(StatusCode::BAD_REQUEST, "Email already registered")
            }
            ApiError::Unauthorized => (
                [(header::WWW_AUTHENTICATE, "Bearer")],
                error_body(StatusCode::UNAUTHORIZED, "Invalid authentication credentials"),
            )
                .into_response(),
            ApiError::Forbidden => error_body(
                StatusCode::FORBIDDEN,
                "Not allowed to modify this resource",
            ),
            ApiError::NotFound(message) => error_body(StatusCode::NOT_FOUND, &message),
            other => {
                error!("Request failed: {}", other);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

fn field_error_body(status: StatusCode, field: &str, message: String) -> Response {
    let body = Json(json!({
        "error": message,
        "field": field,
    }));

    (status, body).into_response()
}

fn error_body(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "error": message,
    }));

    (status, body).into_response()
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::EmailTaken, StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden, StatusCode::FORBIDDEN),
            (ApiError::NotFound("gone".to_string()), StatusCode::NOT_FOUND),
            (ApiError::InternalServerError, StatusCode::INTERNAL_SERVER_ERROR),
            (
                ApiError::Database(DatabaseError::Migration("boom".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_unauthorized_advertises_bearer_scheme() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
