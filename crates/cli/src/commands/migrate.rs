//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! cw-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `CARTWHEEL_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use cartwheel_api::db::create_pool;

use super::CommandError;

/// Run the API database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails, or
/// a migration fails to apply.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
