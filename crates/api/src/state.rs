//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::middleware::ExemptionRules;
use crate::services::token::TokenKeys;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Everything inside is read-only for the
/// process lifetime - the exemption table and token keys are built once here
/// and never mutated, which is what lets the gate run without locks.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    token_keys: TokenKeys,
    exemptions: ExemptionRules,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Derives the token keys from the configured secret and builds the
    /// exemption table from the configured API prefix.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let token_keys = TokenKeys::from_secret(&config.token_secret);
        let exemptions = ExemptionRules::standard(&config.api_prefix);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                token_keys,
                exemptions,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the credential signing/verification keys.
    #[must_use]
    pub fn token_keys(&self) -> &TokenKeys {
        &self.inner.token_keys
    }

    /// Get a reference to the authentication exemption table.
    #[must_use]
    pub fn exemptions(&self) -> &ExemptionRules {
        &self.inner.exemptions
    }
}
