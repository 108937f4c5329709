//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! cleanpro-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CLEANPRO_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/api/migrations/` and are embedded at compile time:
//! ```text
//! migrations/
//! ├── 20250101000001_create_users.sql
//! └── 20250101000002_create_orders.sql
//! ```

use super::{CommandError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
