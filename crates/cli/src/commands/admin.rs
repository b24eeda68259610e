//! Administrator account management.
//!
//! The authorization gate accepts admin credentials only, so a fresh
//! deployment needs at least one administrator created out of band.
//!
//! # Usage
//!
//! ```bash
//! cw-cli admin create -e admin@example.com -n "Admin Name" -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `CARTWHEEL_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use cartwheel_api::db::create_pool;
use cartwheel_api::services::auth::{AuthService, NewUser};

use super::CommandError;

/// Create a new administrator.
///
/// Goes through the same registration path as the API (email validation,
/// password policy, Argon2 hashing), with the admin flag set.
///
/// # Errors
///
/// Returns an error if the database is unreachable, the email is invalid or
/// already registered, or the password fails validation.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    let user = AuthService::new(&pool)
        .register(NewUser {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            phone: String::new(),
            is_admin: true,
            street: String::new(),
            apartment: String::new(),
            city: String::new(),
            zip: String::new(),
            country: String::new(),
        })
        .await?;

    tracing::info!("Created administrator {} (id {})", user.email, user.id);
    Ok(())
}
