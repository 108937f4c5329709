//! The JSON envelope every endpoint answers with.
//!
//! ```json
//! { "success": true, "message": "...", "data": ..., "count": 3 }
//! { "success": false, "message": "Validation failed", "errors": ["..."] }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Response body shared by all endpoints.
///
/// Absent fields are omitted from the JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_verification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> ApiResponse<T> {
    fn empty(success: bool, status: StatusCode) -> Self {
        Self {
            success,
            message: None,
            data: None,
            count: None,
            errors: None,
            requires_verification: None,
            email: None,
            status,
        }
    }

    /// Successful response carrying `data`.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::empty(true, StatusCode::OK)
        }
    }

    /// Set the human-readable message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Answer `201 Created` instead of `200 OK`.
    #[must_use]
    pub const fn created(mut self) -> Self {
        self.status = StatusCode::CREATED;
        self
    }

    /// Mark the response as the first step of a login that still needs a code.
    #[must_use]
    pub fn requires_verification(mut self, email: impl Into<String>) -> Self {
        self.requires_verification = Some(true);
        self.email = Some(email.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Successful list response; `count` is the number of entries.
    #[must_use]
    pub fn list(data: Vec<T>) -> Self {
        Self {
            count: Some(data.len()),
            ..Self::ok(data)
        }
    }
}

impl ApiResponse<()> {
    /// Successful response with only a message.
    #[must_use]
    pub fn done(message: impl Into<String>) -> Self {
        Self::empty(true, StatusCode::OK).message(message)
    }

    /// Failed response.
    #[must_use]
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::empty(false, status).message(message)
    }

    /// Attach the individual problems behind a failure.
    #[must_use]
    pub fn errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_list_counts_entries() {
        let body = serde_json::to_value(ApiResponse::list(vec![1, 2, 3])).unwrap();
        assert_eq!(body, json!({"success": true, "data": [1, 2, 3], "count": 3}));
    }

    #[test]
    fn test_failure_omits_data() {
        let resp = ApiResponse::failure(StatusCode::BAD_REQUEST, "Validation failed")
            .errors(vec!["Client name is required".to_string()]);
        let body = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            body,
            json!({
                "success": false,
                "message": "Validation failed",
                "errors": ["Client name is required"]
            })
        );
    }

    #[test]
    fn test_login_fields_are_camel_case() {
        let body = serde_json::to_value(
            ApiResponse::ok(1).requires_verification("jean@cleanpro.rw"),
        )
        .unwrap();
        assert_eq!(body["requiresVerification"], json!(true));
        assert_eq!(body["email"], json!("jean@cleanpro.rw"));
    }

    #[test]
    fn test_created_status() {
        let resp = ApiResponse::ok(1).created().into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
}
