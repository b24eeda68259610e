//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use cartwheel_core::ProductId;

use super::Category;

/// A product, with its category resolved.
///
/// Products always serialize with the full category embedded, the way the
/// storefront consumes them. The category is a shared reference: deleting a
/// product never touches it, and historical orders keep their price snapshot
/// even if the product is later deleted or repriced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Short plain-text description.
    pub description: String,
    /// Long-form description (HTML allowed).
    pub rich_description: String,
    /// Primary image URL.
    pub image: String,
    /// Brand name.
    pub brand: String,
    /// Current unit price.
    pub price: Decimal,
    /// The category this product belongs to.
    pub category: Category,
    /// Units in stock. Not reserved on order creation.
    pub count_in_stock: i32,
    /// Average review rating.
    pub rating: f32,
    /// Number of reviews behind the rating.
    pub num_reviews: i32,
    /// Whether the product appears in the featured carousel.
    pub is_featured: bool,
    /// When the product was created.
    pub date_created: DateTime<Utc>,
}
