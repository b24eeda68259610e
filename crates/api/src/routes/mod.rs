//! HTTP route handlers for the API.
//!
//! All resource routers are mounted under the configured prefix (default
//! `/api/v1`). The authorization gate is layered over everything; the
//! exemption table decides which of these need a credential.
//!
//! # Route Structure
//!
//! ```text
//! # Categories
//! GET    /categories               - List categories
//! POST   /categories               - Create category
//! GET    /categories/{id}          - Category detail
//! PUT    /categories/{id}          - Update category
//! DELETE /categories/{id}          - Delete category
//!
//! # Products
//! GET    /products                 - List products (?categories=1,2 filter)
//! POST   /products                 - Create product
//! GET    /products/{id}            - Product detail (category joined)
//! PUT    /products/{id}            - Update product
//! DELETE /products/{id}            - Delete product
//! GET    /products/get/count       - Product count
//! GET    /products/get/featured/{count} - Up to N featured products
//!
//! # Users
//! GET    /users                    - List users (no password hashes)
//! POST   /users                    - Create user
//! GET    /users/{id}               - User detail
//! PUT    /users/{id}               - Update user (password optional)
//! DELETE /users/{id}               - Delete user
//! GET    /users/get/count          - User count
//! POST   /users/login              - Login, returns bearer credential
//! POST   /users/register           - Self-registration
//!
//! # Orders
//! GET    /orders                   - List orders (user name resolved)
//! POST   /orders                   - Compose an order from line items
//! GET    /orders/{id}              - Order detail (items -> product -> category)
//! PUT    /orders/{id}              - Update order status
//! DELETE /orders/{id}              - Decompose (order + line items)
//! GET    /orders/get/totalsales    - Sum of all order totals (0 when empty)
//! GET    /orders/get/count         - Order count (0 when empty)
//! GET    /orders/get/userorders/{userId} - One user's orders, full detail
//! ```

pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Response body for delete endpoints.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Build the resource routers, mounted under `prefix`.
pub fn routes(prefix: &str) -> Router<AppState> {
    Router::new()
        .nest(&format!("{prefix}/categories"), categories::routes())
        .nest(&format!("{prefix}/products"), products::routes())
        .nest(&format!("{prefix}/users"), users::routes())
        .nest(&format!("{prefix}/orders"), orders::routes())
}
