//! Persistence for users and orders.
//!
//! # Database: `cleanpro`
//!
//! ## Tables
//!
//! - `users` - Staff accounts, password hashes and the current OTP
//! - `orders` - One row per laundry order
//! - `order_items` - Garment lines, deleted with their order
//!
//! Services depend on the [`UserStore`] and [`OrderStore`] traits rather than
//! on a pool, so they run unchanged against [`PgUserRepository`] /
//! [`PgOrderRepository`] in production and [`InMemoryStore`] in tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p cleanpro-cli -- migrate
//! ```

pub mod memory;
pub mod orders;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use cleanpro_core::{Email, OrderId, OtpCode, UserId};

use crate::models::{
    NewOrder, NewUser, Order, OrderPatch, OrderStats, PendingOtp, ProfileUpdate, UpdatedOrder,
    User,
};

pub use memory::InMemoryStore;
pub use orders::PgOrderRepository;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_insert(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(e)
    }
}

/// Storage for user accounts and their one-time codes.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by exact email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Insert a user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// Replace the user's OTP, invalidating any earlier code.
    async fn store_otp(&self, id: UserId, otp: &PendingOtp) -> Result<(), RepositoryError>;

    /// Match `code` for `email` against the stored, unexpired OTP and, in the same
    /// operation, clear it and mark the user verified.
    ///
    /// Returns `None` when nothing matched; a code can be consumed at most once.
    async fn consume_otp(
        &self,
        email: &Email,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError>;

    /// Match `code` like [`UserStore::consume_otp`] and, in the same operation,
    /// replace the password hash and clear the OTP.
    ///
    /// Returns `false` when the code did not match.
    async fn reset_password_with_otp(
        &self,
        email: &Email,
        code: &OtpCode,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool, RepositoryError>;

    /// Replace the password hash.
    async fn update_password(&self, id: UserId, password_hash: &str)
    -> Result<(), RepositoryError>;

    /// Apply a profile update and return the updated user.
    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<User, RepositoryError>;
}

/// Storage for orders and their items.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All orders, newest first.
    async fn list(&self) -> Result<Vec<Order>, RepositoryError>;

    /// One order by ID.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Insert an order and all its items atomically.
    ///
    /// Returns `RepositoryError::Conflict` if the order code is taken.
    async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError>;

    /// Apply a patch under a row lock, returning the previous status with the
    /// updated order. `None` if the order does not exist.
    async fn update(
        &self,
        id: OrderId,
        patch: &OrderPatch,
    ) -> Result<Option<UpdatedOrder>, RepositoryError>;

    /// Delete an order and its items. Returns `false` if it did not exist.
    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError>;

    /// Case-insensitive substring search over order code, client name and
    /// client phone, newest first. The query is matched literally.
    async fn search(&self, query: &str) -> Result<Vec<Order>, RepositoryError>;

    /// Dashboard figures, with "today" meaning the given UTC calendar date.
    async fn stats(&self, today: NaiveDate) -> Result<OrderStats, RepositoryError>;

    /// Number of orders.
    async fn count(&self) -> Result<i64, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
