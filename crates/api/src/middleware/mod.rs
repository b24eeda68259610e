//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Authorization gate (exemption table + credential check)

pub mod auth;
pub mod request_id;

pub use auth::{CurrentClaims, ExemptionRules, authorization_gate};
pub use request_id::request_id_middleware;
