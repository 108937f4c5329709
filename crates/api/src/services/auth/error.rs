//! Failures of the account and OTP operations.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::NotifyError;

/// Why an [`AuthService`](super::AuthService) call failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more input problems, collected.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Unknown email or wrong password; the two are not told apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No live code matched.
    #[error("invalid or expired verification code")]
    InvalidOtp,

    /// The current password given for a change did not verify.
    #[error("current password is incorrect")]
    IncorrectPassword,

    /// No account has this email.
    #[error("user not found")]
    UserNotFound,

    /// Registration hit an email that is already taken.
    #[error("user already exists")]
    UserAlreadyExists,

    /// The verification code could not be delivered.
    #[error("failed to send verification code: {0}")]
    Notification(#[source] NotifyError),

    #[error("store failure: {0}")]
    Repository(#[from] RepositoryError),

    /// Argon2 could not hash or parse a hash.
    #[error("password hash failure")]
    PasswordHash,
}

impl AuthError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }
}
