//! Business services sitting between the route handlers and the repositories.
//!
//! - [`token`] - bearer-credential issuance and verification
//! - [`auth`] - registration and login on top of argon2 + tokens
//! - [`orders`] - order composition/decomposition over the persistence contract

pub mod auth;
pub mod orders;
pub mod token;
