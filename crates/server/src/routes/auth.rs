//! Public registration and login.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use storerate_core::Role;

use crate::db::PgStorage;
use crate::error::ApiError;
use crate::models::UserSummary;
use crate::services::{AuthService, DirectoryService, UserInput};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    name: String,
    email: String,
    address: String,
    password: String,
    /// Defaults to the end-user role when absent.
    role: Option<Role>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
    user: UserSummary,
}

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    let storage = PgStorage::new(state.pool());
    let directory = DirectoryService::new(&storage);

    let user = directory
        .create_user(UserInput {
            name: &body.name,
            email: &body.email,
            address: &body.address,
            password: &body.password,
            role: body.role.unwrap_or_default(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserSummary::from(&user))))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let storage = PgStorage::new(state.pool());
    let auth = AuthService::new(&storage, state.tokens());

    let (user, token) = auth.login(&body.email, &body.password).await?;

    Ok(Json(LoginResponse {
        token,
        user: UserSummary::from(&user),
    }))
}
