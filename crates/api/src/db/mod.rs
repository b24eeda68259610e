//! Database operations for the Cartwheel `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `categories` - Product categories
//! - `products` - Catalog (category is a foreign key; price is the *current*
//!   price, order totals snapshot it at composition time)
//! - `users` - Accounts and password hashes
//! - `orders` - Purchases; hold their line-item ids in submission order
//! - `order_items` - One product-and-quantity pair, owned by exactly one order
//!
//! # Queries
//!
//! All queries use the runtime `query`/`query_as` API over `FromRow` row
//! structs (not the compile-time macros), so the workspace builds without a
//! reachable database. Row structs convert into the domain types in
//! [`crate::models`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p cartwheel-cli -- migrate
//! ```

pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate email).
    #[error("constraint violation: {0}")]
    Conflict(String),
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
