//! Database access for the rating platform.
//!
//! # Tables
//!
//! - `users(id, name, email unique, address, password_hash, role)`
//! - `stores(id, name, email unique, address)`
//! - `ratings(user_id, store_id, rating, unique(user_id, store_id))`
//!
//! The relational engine sits behind the [`Storage`] query interface; the
//! production implementation is [`PgStorage`]. The unique key on
//! `ratings(user_id, store_id)` is the authoritative guard for the
//! one-rating-per-(user, store) invariant.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via
//! `sqlx migrate run`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use storerate_core::{Email, RatingValue, StoreId, UserId};

use crate::models::{
    NewStore, NewUser, PlatformCounts, RaterEntry, Store, StoreFilter, User, UserFilter,
};

pub mod postgres;

#[cfg(test)]
pub(crate) mod memory;

pub use postgres::PgStorage;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// The acquire timeout bounds every storage call: a saturated pool surfaces
/// as a transient failure instead of hanging the request.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The targeted row does not exist.
    #[error("not found")]
    NotFound,
}

impl RepositoryError {
    /// Whether the error is a transient condition the caller may retry,
    /// rather than a bug or a data problem.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_))
        )
    }
}

/// The query interface the services operate against.
///
/// All reads recompute from current rows; implementations hold no caches.
/// [`upsert_rating`](Storage::upsert_rating) must be atomic with respect to
/// the `(user_id, store_id)` unique key: concurrent submissions for the same
/// pair may never produce two rows.
#[async_trait]
pub trait Storage: Send + Sync {
    // Users

    /// Insert a user; duplicate email yields [`RepositoryError::Conflict`].
    async fn insert_user(&self, new: &NewUser) -> Result<User, RepositoryError>;

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Fetch a user together with their password hash, for login only.
    async fn user_credential(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError>;

    /// Replace a user's password hash.
    ///
    /// Yields [`RepositoryError::NotFound`] if the user does not exist.
    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), RepositoryError>;

    // Stores

    /// Insert a store; duplicate email yields [`RepositoryError::Conflict`].
    async fn insert_store(&self, new: &NewStore) -> Result<Store, RepositoryError>;

    async fn store_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError>;

    async fn store_by_email(&self, email: &Email) -> Result<Option<Store>, RepositoryError>;

    async fn list_stores(&self, filter: &StoreFilter) -> Result<Vec<Store>, RepositoryError>;

    // Ratings

    /// Insert or overwrite the rating for `(user_id, store_id)`.
    async fn upsert_rating(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
    ) -> Result<(), RepositoryError>;

    async fn rating_for(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<RatingValue>, RepositoryError>;

    /// All ratings a user has submitted, keyed by store.
    async fn ratings_by_user(
        &self,
        user_id: UserId,
    ) -> Result<HashMap<StoreId, RatingValue>, RepositoryError>;

    /// Everyone who rated a store, with their values.
    async fn raters_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<RaterEntry>, RepositoryError>;

    /// Mean rating for one store; 0 when it has no ratings.
    async fn average_rating(&self, store_id: StoreId) -> Result<f64, RepositoryError>;

    /// Mean ratings for a set of stores. Stores with no ratings are absent
    /// from the map.
    async fn average_ratings(
        &self,
        store_ids: &[StoreId],
    ) -> Result<HashMap<StoreId, f64>, RepositoryError>;

    /// Platform-wide totals, read atomically.
    async fn counts(&self) -> Result<PlatformCounts, RepositoryError>;
}

/// Turn a raw substring into a `LIKE`/`ILIKE` pattern, escaping the wildcard
/// metacharacters so user input matches literally.
pub(crate) fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
