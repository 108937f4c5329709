//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client with the JSON envelope. All route handlers
//! return `Result<T, AppError>`.

use axum::{
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::routes::envelope::ApiResponse;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// What the client is told about an error.
struct Reply {
    status: StatusCode,
    message: String,
    errors: Option<Vec<String>>,
}

impl Reply {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
        }
    }

    /// A single problem is the message; several go under "Validation failed".
    fn validation(mut errors: Vec<String>) -> Self {
        if errors.len() == 1
            && let Some(only) = errors.pop()
        {
            return Self::new(StatusCode::BAD_REQUEST, only);
        }
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Validation failed".to_owned(),
            errors: Some(errors),
        }
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl AppError {
    fn reply(self) -> Reply {
        match self {
            Self::Auth(err) => match err {
                AuthError::Validation(errors) => Reply::validation(errors),
                AuthError::InvalidCredentials => {
                    Reply::new(StatusCode::UNAUTHORIZED, "Invalid email or password")
                }
                AuthError::InvalidOtp => {
                    Reply::new(StatusCode::UNAUTHORIZED, "Invalid or expired OTP")
                }
                AuthError::IncorrectPassword => {
                    Reply::new(StatusCode::UNAUTHORIZED, "Current password is incorrect")
                }
                AuthError::UserNotFound => Reply::new(StatusCode::NOT_FOUND, "User not found"),
                AuthError::UserAlreadyExists => {
                    Reply::new(StatusCode::CONFLICT, "Email already registered")
                }
                AuthError::Notification(_) => Reply::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send verification code. Please try again.",
                ),
                AuthError::Repository(_) | AuthError::PasswordHash => Reply::internal(),
            },
            Self::Order(err) => match err {
                // Order forms always list their problems, even a single one
                OrderError::Validation(errors) => Reply {
                    status: StatusCode::BAD_REQUEST,
                    message: "Validation failed".to_owned(),
                    errors: Some(errors),
                },
                OrderError::NoValidFields => {
                    Reply::new(StatusCode::BAD_REQUEST, "No valid fields to update")
                }
                OrderError::EmptyQuery => {
                    Reply::new(StatusCode::BAD_REQUEST, "Search query is required")
                }
                OrderError::NotFound => Reply::new(StatusCode::NOT_FOUND, "Order not found"),
                OrderError::DuplicateCode(_) => Reply::new(
                    StatusCode::CONFLICT,
                    "Order code already in use, please try again",
                ),
                OrderError::Repository(_) => Reply::internal(),
            },
            Self::BadRequest(message) => Reply::new(StatusCode::BAD_REQUEST, message),
            Self::Database(_) => Reply::internal(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry; client errors are only logged
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let reply = self.reply();
        let mut body = ApiResponse::failure(reply.status, reply.message);
        if let Some(errors) = reply.errors {
            body = body.errors(errors);
        }
        body.into_response()
    }
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Auth(
                    AuthError::Notification(_) | AuthError::Repository(_) | AuthError::PasswordHash
                )
                | Self::Order(OrderError::Repository(_))
        )
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

/// `axum::Json` whose rejection is the JSON envelope with `400`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` whose rejection is the JSON envelope with `400`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_single_auth_problem_is_the_message() {
        let (status, body) = body_of(AuthError::invalid("Email is required").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "message": "Email is required"}));
    }

    #[tokio::test]
    async fn test_order_validation_lists_errors() {
        let err = OrderError::Validation(vec!["Client name is required".to_string()]);
        let (status, body) = body_of(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("Validation failed"));
        assert_eq!(body["errors"], json!(["Client name is required"]));
    }

    #[tokio::test]
    async fn test_status_codes() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (AuthError::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (AuthError::InvalidOtp.into(), StatusCode::UNAUTHORIZED),
            (AuthError::UserNotFound.into(), StatusCode::NOT_FOUND),
            (AuthError::UserAlreadyExists.into(), StatusCode::CONFLICT),
            (OrderError::NotFound.into(), StatusCode::NOT_FOUND),
            (
                OrderError::DuplicateCode("order_code".to_string()).into(),
                StatusCode::CONFLICT,
            ),
            (
                RepositoryError::NotFound.into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let err = RepositoryError::DataCorruption("bad row 7".to_string());
        let (_, body) = body_of(err.into()).await;
        assert_eq!(body["message"], json!("Internal server error"));
        assert!(!body.to_string().contains("bad row"));
    }
}
