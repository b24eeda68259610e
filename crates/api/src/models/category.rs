//! Category domain types.

use serde::{Deserialize, Serialize};

use cartwheel_core::CategoryId;

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display name (e.g., "Electronics").
    pub name: String,
    /// Icon identifier for storefront rendering.
    pub icon: String,
    /// Accent color (hex string) for storefront rendering.
    pub color: String,
}
