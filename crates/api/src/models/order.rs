//! Order and line-item domain types.
//!
//! A line item is owned by exactly one order for its whole lifetime, but it
//! is created *before* that order exists - order creation materializes the
//! items first, then the order referencing them. Items therefore carry no
//! back-pointer; the order holds its item ids in submission order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use cartwheel_core::{LineItemId, OrderId, UserId};

use super::Product;

/// A customer purchase.
///
/// `total_price` is a snapshot computed when the order was composed:
/// the sum of `product.price * quantity` over all line items *as resolved at
/// creation time*. It is never recomputed, so later price changes do not
/// retroactively alter it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Line-item ids in the order they were submitted.
    #[serde(rename = "orderItems")]
    pub order_item_ids: Vec<LineItemId>,
    /// Shipping address, first line.
    pub shipping_address1: String,
    /// Shipping address, second line.
    pub shipping_address2: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub zip: String,
    /// Country.
    pub country: String,
    /// Contact phone number.
    pub phone: String,
    /// Free-form status string ("Pending", "Shipped", ...). No state machine
    /// is enforced; updates overwrite it verbatim.
    pub status: String,
    /// Price snapshot taken at composition time.
    pub total_price: Decimal,
    /// The purchasing user (weak reference).
    #[serde(rename = "user")]
    pub user_id: UserId,
    /// When the order was placed. List views sort by this, descending.
    pub date_created: DateTime<Utc>,
}

/// List-view projection: an order plus the purchasing user's display name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    /// The order itself.
    #[serde(flatten)]
    pub order: Order,
    /// Display name of the purchasing user, if the user still exists.
    pub user_name: Option<String>,
}

/// Detail-view projection: a line item resolved to its full product (which
/// in turn embeds its category).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDetail {
    /// Unique line-item ID.
    pub id: LineItemId,
    /// Units ordered.
    pub quantity: i32,
    /// The resolved product, `None` if it was deleted after the order was
    /// placed (the order's price snapshot is unaffected).
    pub product: Option<Product>,
}

/// Detail-view projection: one order with its line items fully resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    /// The order itself.
    #[serde(flatten)]
    pub order: Order,
    /// Display name of the purchasing user, if the user still exists.
    pub user_name: Option<String>,
    /// Line items in submission order, each with product and category detail.
    pub items: Vec<LineItemDetail>,
}
