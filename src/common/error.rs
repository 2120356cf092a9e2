// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use crate::auth::service::AuthError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    /// 400 with a provider-sourced detail alongside the message, used by the
    /// OAuth callbacks.
    BadRequestDetailed {
        message: String,
        details: String,
    },
    ValidationError(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::BadRequestDetailed { message, details } => {
                write!(f, "Bad Request: {} ({})", message, details)
            }
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

/// JSON error response structure. `details` is present only for provider
/// failures that carry a safe-to-show reason.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, details) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::BadRequestDetailed { message, details } => {
                (StatusCode::BAD_REQUEST, message, Some(details))
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::InternalServer(msg) => {
                error!(message = %msg, "Internal server error");
                // The logged message may carry internals; the body stays generic.
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorResponse { message, details })).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Conflict => ApiError::BadRequest("User already exists".to_string()),
            AuthError::Token(e) => ApiError::InternalServer(format!("jwt error: {}", e)),
            AuthError::Database(e) => ApiError::DatabaseError(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn response_parts(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unauthorized_wire_body() {
        let (status, body) =
            response_parts(ApiError::Unauthorized("Invalid email or password".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": "Invalid email or password"}));
    }

    #[tokio::test]
    async fn test_conflict_becomes_user_already_exists() {
        let (status, body) = response_parts(AuthError::Conflict.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"message": "User already exists"}));
    }

    #[tokio::test]
    async fn test_exchange_failure_carries_details() {
        let (status, body) = response_parts(ApiError::BadRequestDetailed {
            message: "Failed to exchange code for token".to_string(),
            details: "invalid_grant: Bad Request".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Failed to exchange code for token");
        assert_eq!(body["details"], "invalid_grant: Bad Request");
    }

    #[tokio::test]
    async fn test_internal_errors_are_redacted() {
        let (status, body) =
            response_parts(ApiError::DatabaseError(sqlx::Error::PoolClosed)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Internal server error"}));

        let (status, body) =
            response_parts(ApiError::InternalServer("connection string leaked".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Internal server error"}));
    }
}
