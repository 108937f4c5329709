//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cleanpro_core::{Email, OtpCode, UserId};

/// A staff account (domain type).
///
/// The password hash is kept here so the auth service can verify it, but the
/// type is never serialized; responses use [`PublicProfile`].
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub full_name: String,
    /// Login email, unique and compared exactly as stored.
    pub email: Email,
    /// Contact phone, free text.
    pub phone: Option<String>,
    /// Name of the laundry business.
    pub business_name: Option<String>,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Set once any OTP verification has succeeded.
    pub is_verified: bool,
    /// The most recently issued code, if any.
    pub otp: Option<PendingOtp>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether `code` matches the stored OTP and has not expired at `now`.
    #[must_use]
    pub fn has_valid_otp(&self, code: &OtpCode, now: DateTime<Utc>) -> bool {
        self.otp
            .as_ref()
            .is_some_and(|otp| otp.matches(code, now))
    }

    /// Outward-facing projection.
    #[must_use]
    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            user_id: self.id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            business_name: self.business_name.clone(),
            is_verified: self.is_verified,
            created_at: self.created_at,
        }
    }
}

/// An issued one-time code and its absolute expiry.
///
/// Code and expiry are stored as a pair; a row with only one of them set is
/// read back as "no code".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOtp {
    /// The six-digit code.
    pub code: OtpCode,
    /// The instant after which the code is rejected.
    pub expires_at: DateTime<Utc>,
}

impl PendingOtp {
    /// Whether the code is still usable at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Whether `code` equals this code and it is still live.
    #[must_use]
    pub fn matches(&self, code: &OtpCode, now: DateTime<Utc>) -> bool {
        self.is_live(now) && self.code == *code
    }
}

/// The user fields that leave the service.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub user_id: UserId,
    pub full_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Data needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub password_hash: String,
}

/// Profile fields a user may change.
///
/// `None` leaves a field untouched. For `phone` and `business_name`, `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<Option<String>>,
    pub business_name: Option<Option<String>>,
}

impl ProfileUpdate {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.phone.is_none() && self.business_name.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn user_with_otp(code: &str, expires_at: DateTime<Utc>) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(1),
            full_name: "Jean Marie".to_string(),
            email: Email::parse("jean@cleanpro.rw").unwrap(),
            phone: None,
            business_name: None,
            password_hash: "hash".to_string(),
            is_verified: false,
            otp: Some(PendingOtp {
                code: OtpCode::parse(code).unwrap(),
                expires_at,
            }),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_otp_valid_before_expiry() {
        let now = Utc::now();
        let user = user_with_otp("123456", now + Duration::minutes(10));
        assert!(user.has_valid_otp(&OtpCode::parse("123456").unwrap(), now));
        assert!(!user.has_valid_otp(&OtpCode::parse("654321").unwrap(), now));
    }

    #[test]
    fn test_otp_rejected_at_and_after_expiry() {
        let now = Utc::now();
        let user = user_with_otp("123456", now);
        let code = OtpCode::parse("123456").unwrap();
        assert!(!user.has_valid_otp(&code, now));
        assert!(!user.has_valid_otp(&code, now + Duration::seconds(1)));
    }

    #[test]
    fn test_profile_serializes_camel_case_without_hash() {
        let user = user_with_otp("123456", Utc::now());
        let json = serde_json::to_value(user.profile()).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["fullName"], "Jean Marie");
        assert_eq!(json["isVerified"], false);
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("otp").is_none());
    }

    #[test]
    fn test_profile_update_is_empty() {
        assert!(ProfileUpdate::default().is_empty());
        let update = ProfileUpdate {
            phone: Some(None),
            ..ProfileUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
