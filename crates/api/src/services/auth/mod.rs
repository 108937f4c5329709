//! Authentication service.
//!
//! Provides password registration, login gated by an emailed one-time code,
//! password reset by code, and profile management.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Duration;
use rand::Rng;

use cleanpro_core::{Email, OtpCode};

use crate::db::{RepositoryError, UserStore};
use crate::models::limits::{
    BUSINESS_NAME_MAX_CHARS, NAME_MAX_CHARS, USER_PHONE_MAX_CHARS, fits_chars,
};
use crate::models::{NewUser, PendingOtp, ProfileUpdate, PublicProfile, User};
use crate::services::clock::Clock;
use crate::services::email::Notifier;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// How long an issued code stays valid.
pub const OTP_TTL: Duration = Duration::minutes(10);

/// Input for [`AuthService::register`]. Empty strings count as missing.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
}

/// Input for [`AuthService::update_profile`]. `None` leaves a field untouched;
/// an empty `phone` or `business_name` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub business_name: Option<String>,
}

/// Which email a freshly issued code goes out in.
#[derive(Debug, Clone, Copy)]
enum OtpPurpose {
    Login,
    PasswordReset,
}

/// Authentication service.
///
/// Borrows its collaborators from the application state for the duration of
/// one request.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    notifier: &'a dyn Notifier,
    clock: &'a dyn Clock,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        users: &'a dyn UserStore,
        notifier: &'a dyn Notifier,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            users,
            notifier,
            clock,
        }
    }

    // =========================================================================
    // Registration and login
    // =========================================================================

    /// Register a new user with email and password. No code is sent.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` listing every missing or malformed field.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, input: Registration) -> Result<PublicProfile, AuthError> {
        let mut errors = Vec::new();

        let full_name = input.full_name.trim();
        if full_name.is_empty() || input.email.trim().is_empty() || input.password.is_empty() {
            errors.push("Full name, email, and password are required".to_owned());
        }

        let email = if input.email.trim().is_empty() {
            None
        } else {
            let parsed = Email::parse(&input.email).ok();
            if parsed.is_none() {
                errors.push("Invalid email format".to_owned());
            }
            parsed
        };

        if !input.password.is_empty() && !is_long_enough(&input.password) {
            errors.push(password_length_message());
        }

        let phone = non_blank(input.phone);
        let business_name = non_blank(input.business_name);
        check_lengths(
            Some(full_name),
            phone.as_deref(),
            business_name.as_deref(),
            &mut errors,
        );

        let Some(email) = email.filter(|_| errors.is_empty()) else {
            return Err(AuthError::Validation(errors));
        };

        let password_hash = hash_password(&input.password)?;

        let user = self
            .users
            .create(&NewUser {
                full_name: full_name.to_owned(),
                email,
                phone,
                business_name,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user.profile())
    }

    /// Check the password and email a fresh login code.
    ///
    /// The caller must follow up with [`AuthService::verify_otp`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::Notification` if the code could not be sent.
    pub async fn login(&self, email: &str, password: &str) -> Result<PublicProfile, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::invalid("Email and password are required"));
        }

        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        self.issue_otp(&user, OtpPurpose::Login)
            .await
            .inspect_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Failed to issue login code");
            })?;

        tracing::info!(user_id = %user.id, "Password accepted, verification code sent");
        Ok(user.profile())
    }

    /// Consume a login code and mark the user verified.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOtp` unless the code matches, is unexpired and
    /// has not been used.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<PublicProfile, AuthError> {
        if email.trim().is_empty() || otp.trim().is_empty() {
            return Err(AuthError::invalid("Email and OTP are required"));
        }

        let (email, code) = parse_email_and_code(email, otp)?;
        let user = self
            .users
            .consume_otp(&email, &code, self.clock.now())
            .await?
            .ok_or(AuthError::InvalidOtp)?;

        tracing::info!(user_id = %user.id, "Verification code accepted");
        Ok(user.profile())
    }

    /// Replace the user's code with a new one and send it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account uses the email.
    /// Returns `AuthError::Notification` if the code could not be sent.
    pub async fn resend_otp(&self, email: &str) -> Result<(), AuthError> {
        let user = self.require_user(email).await?;
        self.issue_otp(&user, OtpPurpose::Login).await?;

        tracing::info!(user_id = %user.id, "Verification code resent");
        Ok(())
    }

    // =========================================================================
    // Password reset
    // =========================================================================

    /// Email a reset code if the account exists.
    ///
    /// Succeeds whether or not the email is registered and whether or not the
    /// message went out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the email is missing.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::invalid("Email is required"));
        }

        let Ok(email) = Email::parse(email) else {
            return Ok(());
        };
        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::info!("Password reset requested for unknown email");
            return Ok(());
        };

        match self.issue_otp(&user, OtpPurpose::PasswordReset).await {
            Ok(()) => tracing::info!(user_id = %user.id, "Password reset code sent"),
            Err(AuthError::Notification(e)) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to send password reset code");
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Check a reset code without consuming it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOtp` unless the code is live for the email.
    pub async fn verify_reset_otp(&self, email: &str, otp: &str) -> Result<(), AuthError> {
        if email.trim().is_empty() || otp.trim().is_empty() {
            return Err(AuthError::invalid("Email and OTP are required"));
        }

        let (email, code) = parse_email_and_code(email, otp)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidOtp)?;

        if user.has_valid_otp(&code, self.clock.now()) {
            Ok(())
        } else {
            Err(AuthError::InvalidOtp)
        }
    }

    /// Consume a reset code and set a new password in one step.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for missing fields or a short password.
    /// Returns `AuthError::UserNotFound` if no account uses the email.
    /// Returns `AuthError::InvalidOtp` if the code is not live.
    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let mut errors = Vec::new();
        if email.trim().is_empty() || otp.trim().is_empty() || new_password.is_empty() {
            errors.push("Email, OTP, and new password are required".to_owned());
        }
        if !new_password.is_empty() && !is_long_enough(new_password) {
            errors.push(password_length_message());
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let user = self.require_user(email).await?;
        let code = OtpCode::parse(otp).map_err(|_| AuthError::InvalidOtp)?;
        let password_hash = hash_password(new_password)?;

        let reset = self
            .users
            .reset_password_with_otp(&user.email, &code, self.clock.now(), &password_hash)
            .await?;
        if !reset {
            return Err(AuthError::InvalidOtp);
        }

        tracing::info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Look up a user's public profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account uses the email.
    pub async fn get_profile(&self, email: &str) -> Result<PublicProfile, AuthError> {
        Ok(self.require_user(email).await?.profile())
    }

    /// Change name, phone or business name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if nothing would change, the new name
    /// is blank, or a value is too long to store.
    /// Returns `AuthError::UserNotFound` if no account uses the email.
    pub async fn update_profile(
        &self,
        email: &str,
        changes: ProfileChanges,
    ) -> Result<PublicProfile, AuthError> {
        let update = ProfileUpdate {
            full_name: changes.full_name.map(|name| name.trim().to_owned()),
            phone: changes.phone.map(|phone| non_blank(Some(phone))),
            business_name: changes.business_name.map(|name| non_blank(Some(name))),
        };

        if update.is_empty() {
            return Err(AuthError::invalid("No valid fields to update"));
        }

        let mut errors = Vec::new();
        if update.full_name.as_deref() == Some("") {
            errors.push("Full name cannot be empty".to_owned());
        }
        check_lengths(
            update.full_name.as_deref(),
            update.phone.as_ref().and_then(Option::as_deref),
            update.business_name.as_ref().and_then(Option::as_deref),
            &mut errors,
        );
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let user = self.require_user(email).await?;
        let updated = self.users.update_profile(user.id, &update).await?;

        tracing::info!(user_id = %updated.id, "Profile updated");
        Ok(updated.profile())
    }

    /// Replace the password after re-checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for missing fields or a short password.
    /// Returns `AuthError::UserNotFound` if no account uses the email.
    /// Returns `AuthError::IncorrectPassword` if `current_password` is wrong.
    pub async fn change_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let mut errors = Vec::new();
        if email.trim().is_empty() || current_password.is_empty() || new_password.is_empty() {
            errors.push("Email, current password, and new password are required".to_owned());
        }
        if !new_password.is_empty() && !is_long_enough(new_password) {
            errors.push(password_length_message());
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let user = self.require_user(email).await?;
        verify_password(current_password, &user.password_hash)
            .map_err(|_| AuthError::IncorrectPassword)?;

        let password_hash = hash_password(new_password)?;
        self.users.update_password(user.id, &password_hash).await?;

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn require_user(&self, email: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::invalid("Email is required"));
        }

        let email = Email::parse(email).map_err(|_| AuthError::UserNotFound)?;
        self.users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Store a new code for `user`, replacing any earlier one, then send it.
    ///
    /// A failed send leaves the stored code in place to expire.
    async fn issue_otp(&self, user: &User, purpose: OtpPurpose) -> Result<(), AuthError> {
        let otp = PendingOtp {
            code: generate_otp(),
            expires_at: self.clock.now() + OTP_TTL,
        };
        self.users.store_otp(user.id, &otp).await?;

        let sent = match purpose {
            OtpPurpose::Login => {
                self.notifier
                    .send_otp(&user.email, &user.full_name, &otp.code)
                    .await
            }
            OtpPurpose::PasswordReset => {
                self.notifier
                    .send_password_reset(&user.email, &user.full_name, &otp.code)
                    .await
            }
        };
        sent.map_err(AuthError::Notification)
    }
}

/// Draw a code uniformly from `100000..=999999`.
#[must_use]
pub fn generate_otp() -> OtpCode {
    OtpCode::from_offset(rand::rng().random_range(0..OtpCode::SPACE))
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn is_long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

fn password_length_message() -> String {
    format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long")
}

/// A malformed email or code can never match a stored one.
fn parse_email_and_code(email: &str, otp: &str) -> Result<(Email, OtpCode), AuthError> {
    let email = Email::parse(email).map_err(|_| AuthError::InvalidOtp)?;
    let code = OtpCode::parse(otp).map_err(|_| AuthError::InvalidOtp)?;
    Ok((email, code))
}

/// Reject profile text that would overflow its `users` column.
fn check_lengths(
    full_name: Option<&str>,
    phone: Option<&str>,
    business_name: Option<&str>,
    errors: &mut Vec<String>,
) {
    let fields = [
        ("Full name", full_name, NAME_MAX_CHARS),
        ("Phone", phone, USER_PHONE_MAX_CHARS),
        ("Business name", business_name, BUSINESS_NAME_MAX_CHARS),
    ];
    for (field, value, max) in fields {
        if value.is_some_and(|v| !fits_chars(v, max)) {
            errors.push(format!("{field} must be at most {max} characters"));
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_parse() {
        for _ in 0..200 {
            let code = generate_otp();
            assert_eq!(OtpCode::parse(code.as_str()).unwrap(), code);
        }
    }

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret123", &hash).is_ok());
        assert!(matches!(
            verify_password("secret124", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_password_length_counts_characters() {
        assert!(is_long_enough("abcdef"));
        assert!(!is_long_enough("abcde"));
        assert!(is_long_enough("ñññããã"));
    }

    #[test]
    fn test_check_lengths_lists_each_field() {
        let mut errors = Vec::new();
        check_lengths(
            Some(&"n".repeat(101)),
            Some("+250 788 123 456 789 0"),
            Some(&"b".repeat(151)),
            &mut errors,
        );
        assert_eq!(
            errors,
            vec![
                "Full name must be at most 100 characters",
                "Phone must be at most 20 characters",
                "Business name must be at most 150 characters",
            ]
        );

        let mut errors = Vec::new();
        check_lengths(Some(&"n".repeat(100)), None, Some(&"b".repeat(150)), &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" Kigali ".to_string())), Some("Kigali".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
