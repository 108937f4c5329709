//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! cleanpro-cli user create -n "Jean Marie" -e jean@cleanpro.rw -p secret123
//! ```
//!
//! Users created here go through the same validation and password hashing as
//! `POST /api/auth/register`.

use cleanpro_api::db::PgUserRepository;
use cleanpro_api::services::auth::{AuthService, Registration};
use cleanpro_api::services::clock::SystemClock;
use cleanpro_api::services::email::LogNotifier;

use super::{CommandError, connect};

/// Register a new user.
///
/// # Errors
///
/// Returns an error if the input is invalid, the email is taken or the
/// database is unreachable.
pub async fn create(
    full_name: String,
    email: String,
    password: String,
    phone: Option<String>,
    business_name: Option<String>,
) -> Result<(), CommandError> {
    let pool = connect().await?;
    let users = PgUserRepository::new(pool);

    let profile = AuthService::new(&users, &LogNotifier, &SystemClock)
        .register(Registration {
            full_name,
            email,
            password,
            phone,
            business_name,
        })
        .await?;

    tracing::info!(user_id = %profile.user_id, email = %profile.email, "User created");
    Ok(())
}
