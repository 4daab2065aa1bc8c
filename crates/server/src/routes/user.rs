//! End-user surface: store browsing, rating submission, password update.
//!
//! Every operation is self-scoped: the acting user id comes from the
//! verified claim, never from the request body.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use storerate_core::{RatingValue, StoreId};

use crate::db::PgStorage;
use crate::error::ApiError;
use crate::middleware::AuthClaims;
use crate::models::{StoreFilter, StoreListing};
use crate::services::auth::{Operation, authorize};
use crate::services::{AggregationEngine, AuthService, RatingLedger};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stores", get(list_stores))
        .route("/stores/search", get(search_stores))
        .route("/ratings", post(submit_rating))
        .route("/password", put(update_password))
}

#[derive(Deserialize)]
struct SearchQuery {
    name: Option<String>,
    address: Option<String>,
}

#[derive(Deserialize)]
struct RatingRequest {
    store_id: StoreId,
    rating: i16,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RatingResponse {
    store_id: StoreId,
    rating: RatingValue,
}

#[derive(Deserialize)]
pub(super) struct PasswordRequest {
    pub password: String,
}

/// `GET /api/user/stores`
async fn list_stores(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
) -> Result<Json<Vec<StoreListing>>, ApiError> {
    authorize(&claims, Operation::BrowseStores)?;

    let storage = PgStorage::new(state.pool());
    let listings = AggregationEngine::new(&storage)
        .store_listings(claims.sub, &StoreFilter::default())
        .await?;
    Ok(Json(listings))
}

/// `GET /api/user/stores/search`
async fn search_stores(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<StoreListing>>, ApiError> {
    authorize(&claims, Operation::SearchStores)?;

    let storage = PgStorage::new(state.pool());
    let listings = AggregationEngine::new(&storage)
        .store_listings(
            claims.sub,
            &StoreFilter {
                name: query.name,
                address: query.address,
                email: None,
            },
        )
        .await?;
    Ok(Json(listings))
}

/// `POST /api/user/ratings`
async fn submit_rating(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Json(body): Json<RatingRequest>,
) -> Result<Json<RatingResponse>, ApiError> {
    authorize(&claims, Operation::SubmitRating)?;

    let storage = PgStorage::new(state.pool());
    let stored = RatingLedger::new(&storage)
        .submit(claims.sub, body.store_id, body.rating)
        .await?;

    Ok(Json(RatingResponse {
        store_id: body.store_id,
        rating: stored,
    }))
}

/// `PUT /api/user/password`
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
