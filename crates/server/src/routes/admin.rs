//! Admin surface: account and store management, platform dashboard.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use storerate_core::{Role, UserId};

use crate::db::PgStorage;
use crate::error::ApiError;
use crate::middleware::AuthClaims;
use crate::models::{PlatformCounts, StoreFilter, StoreWithRating, UserDetail, UserFilter};
use crate::services::auth::{Operation, authorize};
use crate::services::{AggregationEngine, DirectoryService, StoreInput, UserInput};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/{id}", get(user_detail))
        .route("/stores", post(create_store).get(list_stores))
        .route("/dashboard", get(dashboard))
}

#[derive(Deserialize)]
struct CreateUserRequest {
    name: String,
    email: String,
    address: String,
    password: String,
    role: Option<Role>,
}

#[derive(Deserialize)]
struct CreateStoreRequest {
    name: String,
    email: String,
    address: String,
}

#[derive(Deserialize)]
struct UserListQuery {
    name: Option<String>,
    email: Option<String>,
    address: Option<String>,
    role: Option<Role>,
}

#[derive(Deserialize)]
struct StoreListQuery {
    name: Option<String>,
    email: Option<String>,
    address: Option<String>,
}

/// `POST /api/admin/users`
async fn create_user(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDetail>), ApiError> {
    authorize(&claims, Operation::AddUser)?;

    let storage = PgStorage::new(state.pool());
    let user = DirectoryService::new(&storage)
        .create_user(UserInput {
            name: &body.name,
            email: &body.email,
            address: &body.address,
            password: &body.password,
            role: body.role.unwrap_or_default(),
        })
        .await?;

    let detail = UserDetail {
        id: user.id,
        name: user.name,
        email: user.email,
        address: user.address,
        role: user.role,
        rating: None,
    };
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `GET /api/admin/users`
async fn list_users(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserDetail>>, ApiError> {
    authorize(&claims, Operation::ListUsers)?;

    let storage = PgStorage::new(state.pool());
    let users = DirectoryService::new(&storage)
        .list_users(&UserFilter {
            name: query.name,
            email: query.email,
            address: query.address,
            role: query.role,
        })
        .await?;

    let rows = users
        .into_iter()
        .map(|user| UserDetail {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            role: user.role,
            rating: None,
        })
        .collect();
    Ok(Json(rows))
}

/// `GET /api/admin/users/{id}`
async fn user_detail(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Path(id): Path<UserId>,
) -> Result<Json<UserDetail>, ApiError> {
    authorize(&claims, Operation::GetUserDetail)?;

    let storage = PgStorage::new(state.pool());
    let detail = DirectoryService::new(&storage).user_detail(id).await?;
    Ok(Json(detail))
}

/// `POST /api/admin/stores`
async fn create_store(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Json(body): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreWithRating>), ApiError> {
    authorize(&claims, Operation::AddStore)?;

    let storage = PgStorage::new(state.pool());
    let store = DirectoryService::new(&storage)
        .create_store(StoreInput {
            name: &body.name,
            email: &body.email,
            address: &body.address,
        })
        .await?;

    let created = StoreWithRating {
        id: store.id,
        name: store.name,
        email: store.email,
        address: store.address,
        average_rating: 0.0,
    };
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/admin/stores`
async fn list_stores(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Query(query): Query<StoreListQuery>,
) -> Result<Json<Vec<StoreWithRating>>, ApiError> {
    authorize(&claims, Operation::ListStores)?;

    let storage = PgStorage::new(state.pool());
    let stores = DirectoryService::new(&storage)
        .list_stores(&StoreFilter {
            name: query.name,
            email: query.email,
            address: query.address,
        })
        .await?;
    Ok(Json(stores))
}

/// `GET /api/admin/dashboard`
async fn dashboard(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
) -> Result<Json<PlatformCounts>, ApiError> {
    authorize(&claims, Operation::DashboardCounts)?;

    let storage = PgStorage::new(state.pool());
    let counts = AggregationEngine::new(&storage).dashboard_counts().await?;
    Ok(Json(counts))
}
