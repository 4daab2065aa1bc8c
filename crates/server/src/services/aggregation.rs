//! Computed views over the ledger and directory.
//!
//! Every aggregate is recomputed from current rows on each call; nothing is
//! cached, so staleness is bounded only by request latency.

use thiserror::Error;

use storerate_core::{Email, RatingValue, StoreId, UserId};

use crate::db::{RepositoryError, Storage};
use crate::models::{OwnerDashboard, PlatformCounts, StoreFilter, StoreListing};

/// Errors from the aggregation engine.
#[derive(Debug, Error)]
pub enum AggregationError {
    /// The caller's account has no matching store.
    #[error("no store is registered for this account")]
    NoOwnedStore,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Derived, read-only views over a [`Storage`] backend.
pub struct AggregationEngine<'a, S> {
    storage: &'a S,
}

impl<'a, S: Storage> AggregationEngine<'a, S> {
    pub const fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Mean rating for one store; 0 when it has none.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the query fails.
    pub async fn average_rating(&self, store_id: StoreId) -> Result<f64, AggregationError> {
        Ok(self.storage.average_rating(store_id).await?)
    }

    /// The caller's own prior rating for a store, if any.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the query fails.
    pub async fn store_overlay(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<RatingValue>, AggregationError> {
        Ok(self.storage.rating_for(user_id, store_id).await?)
    }

    /// The store catalog for a browsing user: each store's crowd average
    /// with the caller's own rating overlaid.
    ///
    /// # Errors
    ///
    /// Returns a repository error if any query fails; no partial listing is
    /// returned.
    pub async fn store_listings(
        &self,
        user_id: UserId,
        filter: &StoreFilter,
    ) -> Result<Vec<StoreListing>, AggregationError> {
        let stores = self.storage.list_stores(filter).await?;
        let ids: Vec<StoreId> = stores.iter().map(|s| s.id).collect();
        let averages = self.storage.average_ratings(&ids).await?;
        let own = self.storage.ratings_by_user(user_id).await?;

        Ok(stores
            .into_iter()
            .map(|store| StoreListing {
                average_rating: averages.get(&store.id).copied().unwrap_or(0.0),
                user_rating: own.get(&store.id).copied(),
                id: store.id,
                name: store.name,
                address: store.address,
            })
            .collect())
    }

    /// Platform-wide totals for the admin dashboard, read as one snapshot.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the query fails.
    pub async fn dashboard_counts(&self) -> Result<PlatformCounts, AggregationError> {
        Ok(self.storage.counts().await?)
    }

    /// The dashboard for the store owned by `owner_email`: the store's
    /// average and everyone who rated it.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::NoOwnedStore`] when no store carries the
    /// caller's email.
    pub async fn owner_dashboard(
        &self,
        owner_email: &Email,
    ) -> Result<OwnerDashboard, AggregationError> {
        let store = self
            .storage
            .store_by_email(owner_email)
            .await?
            .ok_or(AggregationError::NoOwnedStore)?;

        let average_rating = self.storage.average_rating(store.id).await?;
        let raters = self.storage.raters_for_store(store.id).await?;

        Ok(OwnerDashboard {
            store_id: store.id,
            average_rating,
            raters,
        })
    }
}
