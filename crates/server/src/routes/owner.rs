//! Store-owner surface: own-store dashboard and password update.
//!
//! The owned store is resolved from the claim's email, so an owner can
//! never read another store's dashboard.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::db::PgStorage;
use crate::error::ApiError;
use crate::middleware::AuthClaims;
use crate::models::OwnerDashboard;
use crate::services::auth::{Operation, authorize};
use crate::services::{AggregationEngine, AuthService};
use crate::state::AppState;

use super::user::PasswordRequest;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/password", put(update_password))
}

/// `GET /api/owner/dashboard`
async fn dashboard(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
) -> Result<Json<OwnerDashboard>, ApiError> {
    authorize(&claims, Operation::OwnerDashboard)?;

    let storage = PgStorage::new(state.pool());
    let dashboard = AggregationEngine::new(&storage)
        .owner_dashboard(&claims.email)
        .await?;
    Ok(Json(dashboard))
}

/// `PUT /api/owner/password`
async fn update_password(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Json(body): Json<PasswordRequest>,
) -> Result<StatusCode, ApiError> {
    authorize(&claims, Operation::UpdatePassword)?;

    let storage = PgStorage::new(state.pool());
    AuthService::new(&storage, state.tokens())
        .change_password(claims.sub, &body.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
