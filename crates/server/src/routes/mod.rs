//! HTTP router.
//!
//! ```text
//! POST /register             public self-registration
//! POST /login                public login
//! GET  /health               liveness
//! GET  /health/ready         readiness (checks the database)
//! /api/admin/...             admin role
//! /api/user/...              user role
//! /api/owner/...             store-owner role
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod owner;
pub mod user;

/// Build the full application router.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .nest("/api/admin", admin::router())
        .nest("/api/user", user::router())
        .nest("/api/owner", owner::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `GET /health`
async fn health() -> StatusCode {
    StatusCode::OK
}

/// `GET /health/ready`
async fn ready(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(error) => {
            tracing::warn!(%error, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
