//! `PostgreSQL` user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cleanpro_core::{Email, OtpCode, UserId};

use super::{RepositoryError, UserStore};
use crate::models::{NewUser, PendingOtp, ProfileUpdate, User};

const USER_COLUMNS: &str = "id, full_name, email, phone, business_name, password_hash, \
     is_verified, otp_code, otp_expires_at, created_at, updated_at";

/// Repository for user database operations.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    full_name: String,
    email: String,
    phone: Option<String>,
    business_name: Option<String>,
    password_hash: String,
    is_verified: bool,
    otp_code: Option<String>,
    otp_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        // A half-set pair is treated as no code at all
        let otp = match (r.otp_code, r.otp_expires_at) {
            (Some(code), Some(expires_at)) => Some(PendingOtp {
                code: OtpCode::parse(&code).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid otp in database: {e}"))
                })?,
                expires_at,
            }),
            _ => None,
        };

        Ok(Self {
            id: r.id,
            full_name: r.full_name,
            email,
            phone: r.phone,
            business_name: r.business_name,
            password_hash: r.password_hash,
            is_verified: r.is_verified,
            otp,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (full_name, email, phone, business_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(&user.full_name)
        .bind(user.email.as_str())
        .bind(user.phone.as_deref())
        .bind(user.business_name.as_deref())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email"))?;

        User::try_from(row)
    }

    async fn store_otp(&self, id: UserId, otp: &PendingOtp) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET otp_code = $2, otp_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(otp.code.as_str())
        .bind(otp.expires_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn consume_otp(
        &self,
        email: &Email,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            UPDATE users
            SET is_verified = TRUE, otp_code = NULL, otp_expires_at = NULL, updated_at = NOW()
            WHERE email = $1 AND otp_code = $2 AND otp_expires_at > $3
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(email.as_str())
        .bind(code.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn reset_password_with_otp(
        &self,
        email: &Email,
        code: &OtpCode,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET password_hash = $4, otp_code = NULL, otp_expires_at = NULL, updated_at = NOW()
            WHERE email = $1 AND otp_code = $2 AND otp_expires_at > $3
            ",
        )
        .bind(email.as_str())
        .bind(code.as_str())
        .bind(now)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<User, RepositoryError> {
        // $3/$5 say whether the nullable column is being set, $4/$6 carry the value
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                phone = CASE WHEN $3 THEN $4 ELSE phone END,
                business_name = CASE WHEN $5 THEN $6 ELSE business_name END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(update.full_name.as_deref())
        .bind(update.phone.is_some())
        .bind(update.phone.clone().flatten())
        .bind(update.business_name.is_some())
        .bind(update.business_name.clone().flatten())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        User::try_from(row)
    }
}
