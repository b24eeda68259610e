//! User route handlers.
//!
//! `POST /login` and `POST /register` are the two exact-path exemptions in
//! the gate's table; everything else here requires an admin credential.
//! Password hashes never appear in any response.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use cartwheel_core::{Email, UserId};

use super::DeleteResponse;
use crate::db::UserRepository;
use crate::db::users::UserFields;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::auth::{AuthService, NewUser};
use crate::state::AppState;

/// Create/register request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewUserPayload {
    name: String,
    email: String,
    password: String,
    phone: String,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    street: String,
    #[serde(default)]
    apartment: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    zip: String,
    #[serde(default)]
    country: String,
}

impl From<NewUserPayload> for NewUser {
    fn from(payload: NewUserPayload) -> Self {
        Self {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            phone: payload.phone,
            is_admin: payload.is_admin,
            street: payload.street,
            apartment: payload.apartment,
            city: payload.city,
            zip: payload.zip,
            country: payload.country,
        }
    }
}

/// Update request body; a missing `password` keeps the stored hash.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserPayload {
    name: String,
    email: String,
    password: Option<String>,
    phone: String,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    street: String,
    #[serde(default)]
    apartment: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    zip: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    /// The authenticated email, echoed back for the storefront UI.
    user: String,
    /// Bearer credential, valid for one day.
    token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserCount {
    user_count: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/get/count", get(count))
        .route("/login", post(login))
        .route("/register", post(register))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(Json(users))
}

async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(UserId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
    Ok(Json(user))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewUserPayload>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.pool())
        .register(payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<User>> {
    let email = Email::parse(&payload.email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    // Only re-hash when the caller supplied a new password.
    let password_hash = payload
        .password
        .as_deref()
        .map(|password| AuthService::new(state.pool()).hash_new_password(password))
        .transpose()?;

    let fields = UserFields {
        name: payload.name,
        email,
        password_hash,
        phone: payload.phone,
        is_admin: payload.is_admin,
        street: payload.street,
        apartment: payload.apartment,
        city: payload.city,
        zip: payload.zip,
        country: payload.country,
    };

    let user = UserRepository::new(state.pool())
        .update(UserId::new(id), &fields)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
    Ok(Json(user))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteResponse>> {
    let deleted = UserRepository::new(state.pool())
        .delete(UserId::new(id))
        .await?;
    if !deleted {
        return Err(AppError::NotFound(format!("user {id}")));
    }
    Ok(Json(DeleteResponse {
        success: true,
        message: "the user is deleted",
    }))
}

async fn count(State(state): State<AppState>) -> Result<Json<UserCount>> {
    // Zero registered users is a fresh install, not a missing resource.
    let user_count = UserRepository::new(state.pool()).count().await?;
    Ok(Json(UserCount { user_count }))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>> {
    let (user, token) = AuthService::new(state.pool())
        .login(state.token_keys(), &payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        user: user.email.into_inner(),
        token,
    }))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUserPayload>,
) -> Result<(StatusCode, Json<User>)> {
    let user = AuthService::new(state.pool())
        .register(payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}
