//! Category route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use cartwheel_core::CategoryId;

use super::DeleteResponse;
use crate::db::CategoryRepository;
use crate::db::categories::CategoryFields;
use crate::error::{AppError, Result};
use crate::models::Category;
use crate::state::AppState;

/// Create/update request body.
#[derive(Debug, Deserialize)]
struct CategoryPayload {
    name: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    color: String,
}

impl From<CategoryPayload> for CategoryFields {
    fn from(payload: CategoryPayload) -> Self {
        Self {
            name: payload.name,
            icon: payload.icon,
            color: payload.color,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list_all().await?;
    Ok(Json(categories))
}

async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Category>> {
    let category = CategoryRepository::new(state.pool())
        .get_by_id(CategoryId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;
    Ok(Json(category))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = CategoryRepository::new(state.pool())
        .create(&payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Category>> {
    let category = CategoryRepository::new(state.pool())
        .update(CategoryId::new(id), &payload.into())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;
    Ok(Json(category))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteResponse>> {
    let deleted = CategoryRepository::new(state.pool())
        .delete(CategoryId::new(id))
        .await?;
    if !deleted {
        return Err(AppError::NotFound(format!("category {id}")));
    }
    Ok(Json(DeleteResponse {
        success: true,
        message: "the category is deleted",
    }))
}
