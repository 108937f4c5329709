//! Authentication routes.
//!
//! Login is two steps: `POST /login` checks the password and emails a code,
//! `POST /verify-otp` consumes the code. No session or token is issued.

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::error::{ApiJson, Result};
use crate::models::PublicProfile;
use crate::routes::envelope::ApiResponse;
use crate::services::auth::{ProfileChanges, Registration};
use crate::state::AppState;

/// Reply to every password reset request, whether or not the account exists.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists for this email, a password reset code has been sent";

// ============================================================================
// Request bodies
// ============================================================================

/// Request to register a new user.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    #[serde(alias = "fullName")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "businessName")]
    pub business_name: Option<String>,
}

/// Request to log in with a password.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request carrying an email and a code.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OtpRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}

/// Request carrying only an email.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmailRequest {
    pub email: Option<String>,
}

/// Request to set a new password with a reset code.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
    #[serde(alias = "newPassword")]
    pub new_password: Option<String>,
}

/// Request to change profile fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    #[serde(alias = "fullName")]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "businessName")]
    pub business_name: Option<String>,
}

/// Request to change the password.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub email: Option<String>,
    #[serde(alias = "currentPassword")]
    pub current_password: Option<String>,
    #[serde(alias = "newPassword")]
    pub new_password: Option<String>,
}

/// Query string of `GET /profile`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileQuery {
    pub email: Option<String>,
}

fn text(value: Option<String>) -> String {
    value.unwrap_or_default()
}

// ============================================================================
// Registration and login
// ============================================================================

/// POST /api/auth/register
///
/// # Errors
///
/// Returns `AppError` on validation failure or a taken email.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<ApiResponse<PublicProfile>> {
    let profile = state
        .auth()
        .register(Registration {
            full_name: text(req.full_name),
            email: text(req.email),
            password: text(req.password),
            phone: req.phone,
            business_name: req.business_name,
        })
        .await?;

    Ok(ApiResponse::ok(profile)
        .message("Registration successful! Please login to continue.")
        .created())
}

/// POST /api/auth/login
///
/// # Errors
///
/// Returns `AppError` on bad credentials or if the code could not be sent.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<ApiResponse<PublicProfile>> {
    let profile = state
        .auth()
        .login(&text(req.email), &text(req.password))
        .await?;

    let email = profile.email.to_string();
    Ok(ApiResponse::ok(profile)
        .message("Verification code sent to your email. Please verify to continue.")
        .requires_verification(email))
}

/// POST /api/auth/verify-otp
///
/// # Errors
///
/// Returns `AppError` if the code is wrong, expired or already used.
pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<OtpRequest>,
) -> Result<ApiResponse<PublicProfile>> {
    let profile = state
        .auth()
        .verify_otp(&text(req.email), &text(req.otp))
        .await?;

    Ok(ApiResponse::ok(profile).message("Verification successful! Redirecting to dashboard..."))
}

/// POST /api/auth/resend-otp
///
/// # Errors
///
/// Returns `AppError` for an unknown email or if the code could not be sent.
pub async fn resend_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> Result<ApiResponse<()>> {
    state.auth().resend_otp(&text(req.email)).await?;
    Ok(ApiResponse::done("New verification code sent to your email"))
}

// ============================================================================
// Password reset
// ============================================================================

/// POST /api/auth/forgot-password
///
/// # Errors
///
/// Returns `AppError` only for a missing email or a store failure.
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> Result<ApiResponse<()>> {
    state.auth().forgot_password(&text(req.email)).await?;
    Ok(ApiResponse::done(FORGOT_PASSWORD_MESSAGE))
}

/// POST /api/auth/verify-reset-otp
///
/// # Errors
///
/// Returns `AppError` if the code is not live.
pub async fn verify_reset_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<OtpRequest>,
) -> Result<ApiResponse<()>> {
    state
        .auth()
        .verify_reset_otp(&text(req.email), &text(req.otp))
        .await?;
    Ok(ApiResponse::done("Verification code is valid"))
}

/// POST /api/auth/reset-password
///
/// # Errors
///
/// Returns `AppError` on validation failure, an unknown email or a dead code.
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> Result<ApiResponse<()>> {
    state
        .auth()
        .reset_password(&text(req.email), &text(req.otp), &text(req.new_password))
        .await?;
    Ok(ApiResponse::done(
        "Password reset successful! Please login with your new password.",
    ))
}

// ============================================================================
// Profile
// ============================================================================

/// GET /api/auth/profile?email=
///
/// # Errors
///
/// Returns `AppError` for a missing or unknown email.
pub async fn get_profile(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Result<ApiResponse<PublicProfile>> {
    let profile = state.auth().get_profile(&text(query.email)).await?;
    Ok(ApiResponse::ok(profile))
}

/// PUT /api/auth/profile
///
/// # Errors
///
/// Returns `AppError` on validation failure or an unknown email.
pub async fn update_profile(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<ApiResponse<PublicProfile>> {
    let profile = state
        .auth()
        .update_profile(
            &text(req.email),
            ProfileChanges {
                full_name: req.full_name,
                phone: req.phone,
                business_name: req.business_name,
            },
        )
        .await?;

    Ok(ApiResponse::ok(profile).message("Profile updated successfully"))
}

/// PUT /api/auth/change-password
///
/// # Errors
///
/// Returns `AppError` on validation failure, an unknown email or a wrong
/// current password.
pub async fn change_password(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<ApiResponse<()>> {
    state
        .auth()
        .change_password(
            &text(req.email),
            &text(req.current_password),
            &text(req.new_password),
        )
        .await?;
    Ok(ApiResponse::done("Password changed successfully"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_accepts_both_spellings() {
        let snake: RegisterRequest =
            serde_json::from_str(r#"{"full_name":"Jean","business_name":"Kigali Dry"}"#).unwrap();
        let camel: RegisterRequest =
            serde_json::from_str(r#"{"fullName":"Jean","businessName":"Kigali Dry"}"#).unwrap();
        assert_eq!(snake.full_name, camel.full_name);
        assert_eq!(snake.business_name, camel.business_name);
    }

    #[test]
    fn test_missing_fields_default() {
        let req: ChangePasswordRequest = serde_json::from_str("{}").unwrap();
        assert!(req.email.is_none());
        assert!(req.current_password.is_none());

        let req: ChangePasswordRequest =
            serde_json::from_str(r#"{"currentPassword":"a","newPassword":"b"}"#).unwrap();
        assert_eq!(req.current_password.as_deref(), Some("a"));
        assert_eq!(req.new_password.as_deref(), Some("b"));
    }
}
