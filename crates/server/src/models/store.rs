//! Store domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storerate_core::{Email, RatingValue, StoreId};

/// A registered store (domain type).
///
/// The store's email associates it with the owning store-owner account by
/// email equality; there is no foreign key between the two tables.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Store name.
    pub name: String,
    /// Contact email (unique; matches the owner's account email).
    pub email: Email,
    /// Street address.
    pub address: String,
    /// When the store was registered.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a store.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub email: Email,
    pub address: String,
}

/// Conjunction of optional store list predicates (case-insensitive
/// substrings).
#[derive(Debug, Clone, Default)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Admin listing entry: a store with its current average rating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreWithRating {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
    /// Mean of all ratings, 0 when the store has none.
    pub average_rating: f64,
}

/// End-user listing entry: the crowd average plus the caller's own prior
/// rating (the overlay), so a browsing user sees both at once.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListing {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub average_rating: f64,
    pub user_rating: Option<RatingValue>,
}
