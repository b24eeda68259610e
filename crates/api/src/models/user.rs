//! User domain types.

use serde::Serialize;

use cartwheel_core::{Email, UserId};

/// A registered user.
///
/// The password hash is deliberately not part of this type - it never leaves
/// the `users` repository except through the dedicated login lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique).
    pub email: Email,
    /// Contact phone number.
    pub phone: String,
    /// Whether this user passes the admin-only authorization policy.
    pub is_admin: bool,
    /// Street address.
    pub street: String,
    /// Apartment / unit.
    pub apartment: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub zip: String,
    /// Country.
    pub country: String,
}
