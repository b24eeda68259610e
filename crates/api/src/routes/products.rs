//! Product route handlers.
//!
//! Catalog reads are exempt from authentication; writes require an admin
//! credential (enforced by the gate, not here). Product create/update
//! validates the category reference up front so a dangling id is a clean
//! 400 instead of a foreign-key error.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartwheel_core::{CategoryId, ProductId};

use super::DeleteResponse;
use crate::db::products::ProductFields;
use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::Product;
use crate::state::AppState;

/// Create/update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductPayload {
    name: String,
    description: String,
    #[serde(default)]
    rich_description: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    brand: String,
    price: Decimal,
    category: CategoryId,
    count_in_stock: i32,
    #[serde(default)]
    rating: f32,
    #[serde(default)]
    num_reviews: i32,
    #[serde(default)]
    is_featured: bool,
}

impl From<ProductPayload> for ProductFields {
    fn from(payload: ProductPayload) -> Self {
        Self {
            name: payload.name,
            description: payload.description,
            rich_description: payload.rich_description,
            image: payload.image,
            brand: payload.brand,
            price: payload.price,
            category_id: payload.category,
            count_in_stock: payload.count_in_stock,
            rating: payload.rating,
            num_reviews: payload.num_reviews,
            is_featured: payload.is_featured,
        }
    }
}

/// Query parameters for the list endpoint.
#[derive(Debug, Deserialize)]
struct ListQuery {
    /// Comma-separated category ids, e.g. `?categories=1,3`.
    categories: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductCount {
    product_count: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/get/count", get(count))
        .route("/get/featured/{count}", get(featured))
}

/// Parse the `?categories=1,2,3` filter.
fn parse_category_filter(raw: &str) -> Result<Vec<CategoryId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .map(CategoryId::new)
                .map_err(|_| AppError::BadRequest(format!("invalid category id '{s}'")))
        })
        .collect()
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.pool());
    let products = match query.categories.as_deref() {
        Some(raw) => repo.list(Some(&parse_category_filter(raw)?)).await?,
        None => repo.list(None).await?,
    };
    Ok(Json(products))
}

async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(product))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>)> {
    ensure_category_exists(&state, payload.category).await?;

    let product = ProductRepository::new(state.pool())
        .create(&payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>> {
    ensure_category_exists(&state, payload.category).await?;

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &payload.into())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(Json(product))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteResponse>> {
    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;
    if !deleted {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    Ok(Json(DeleteResponse {
        success: true,
        message: "the product is deleted",
    }))
}

async fn count(State(state): State<AppState>) -> Result<Json<ProductCount>> {
    // Zero products is an empty catalog, not a missing resource.
    let product_count = ProductRepository::new(state.pool()).count().await?;
    Ok(Json(ProductCount { product_count }))
}

async fn featured(
    State(state): State<AppState>,
    Path(count): Path<i64>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .featured(count.max(0))
        .await?;
    Ok(Json(products))
}

async fn ensure_category_exists(state: &AppState, id: CategoryId) -> Result<()> {
    let exists = CategoryRepository::new(state.pool()).exists(id).await?;
    if exists {
        Ok(())
    } else {
        Err(AppError::BadRequest("invalid category".to_string()))
    }
}
