//! Order route handlers.
//!
//! Creation and deletion go through the composer/decomposer in
//! [`crate::services::orders`]; everything else is a read-only view or a
//! status update. All of these sit behind the gate - there are no order
//! exemptions.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartwheel_core::{OrderId, ProductId, UserId};

use super::DeleteResponse;
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentClaims;
use crate::models::{Order, OrderDetail, OrderSummary};
use crate::services::orders::{LineItemDraft, OrderDraft, OrderService};
use crate::state::AppState;

/// One requested line item.
#[derive(Debug, Deserialize)]
struct OrderItemPayload {
    /// Referenced product id.
    product: ProductId,
    quantity: u32,
}

/// Order creation request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewOrderPayload {
    order_items: Vec<OrderItemPayload>,
    shipping_address1: String,
    #[serde(default)]
    shipping_address2: String,
    city: String,
    zip: String,
    country: String,
    phone: String,
    #[serde(default = "default_status")]
    status: String,
    /// The purchasing user.
    user: UserId,
}

fn default_status() -> String {
    "Pending".to_string()
}

/// Status update request body.
#[derive(Debug, Deserialize)]
struct StatusPayload {
    status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TotalSales {
    total_sales: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderCount {
    order_count: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update_status).delete(remove))
        .route("/get/totalsales", get(total_sales))
        .route("/get/count", get(count))
        .route("/get/userorders/{user_id}", get(user_orders))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<OrderSummary>>> {
    let orders = OrderRepository::new(state.pool()).list_with_users().await?;
    Ok(Json(orders))
}

async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<OrderDetail>> {
    let order = OrderRepository::new(state.pool())
        .detail(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(order))
}

async fn create(
    State(state): State<AppState>,
    CurrentClaims(claims): CurrentClaims,
    Json(payload): Json<NewOrderPayload>,
) -> Result<(StatusCode, Json<Order>)> {
    let draft = OrderDraft {
        items: payload
            .order_items
            .iter()
            .map(|item| LineItemDraft {
                product_id: item.product,
                quantity: item.quantity,
            })
            .collect(),
        shipping_address1: payload.shipping_address1,
        shipping_address2: payload.shipping_address2,
        city: payload.city,
        zip: payload.zip,
        country: payload.country,
        phone: payload.phone,
        status: payload.status,
        user_id: payload.user,
    };

    tracing::debug!(placed_by = %claims.user_id, "composing order");

    let service = OrderService::new(OrderRepository::new(state.pool()));
    let order = service.compose(draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), &payload.status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(order))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteResponse>> {
    let service = OrderService::new(OrderRepository::new(state.pool()));
    service.decompose(OrderId::new(id)).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "the order is deleted",
    }))
}

async fn total_sales(State(state): State<AppState>) -> Result<Json<TotalSales>> {
    // An empty shop sums to literal zero; it is not a failure.
    let total = OrderRepository::new(state.pool()).total_sales().await?;
    Ok(Json(TotalSales { total_sales: total }))
}

async fn count(State(state): State<AppState>) -> Result<Json<OrderCount>> {
    let order_count = OrderRepository::new(state.pool()).count().await?;
    Ok(Json(OrderCount { order_count }))
}

async fn user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<OrderDetail>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(UserId::new(user_id))
        .await?;
    Ok(Json(orders))
}
