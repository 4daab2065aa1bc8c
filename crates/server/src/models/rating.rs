//! Rating ledger view types.

use serde::Serialize;

use storerate_core::{Email, RatingValue, StoreId, UserId};

/// One rater on a store's dashboard: who they are and what they gave.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RaterEntry {
    pub user_id: UserId,
    pub name: String,
    pub email: Email,
    pub rating: RatingValue,
}

/// Platform-wide totals for the admin dashboard.
///
/// Computed fresh on every call; there is no caching.
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlatformCounts {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

/// The store-owner's view of their own store's feedback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDashboard {
    pub store_id: StoreId,
    pub average_rating: f64,
    pub raters: Vec<RaterEntry>,
}
