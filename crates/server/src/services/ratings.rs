//! The rating ledger: one rating per (user, store), upserted in place.

use thiserror::Error;

use storerate_core::{RatingOutOfRange, RatingValue, StoreId, UserId};

use crate::db::{RepositoryError, Storage};
use crate::models::RaterEntry;

/// Errors from the rating ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The submitted value is outside 1..=5.
    #[error(transparent)]
    OutOfRange(#[from] RatingOutOfRange),

    /// The targeted store does not exist.
    #[error("store not found")]
    UnknownStore,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Rating reads and writes over a [`Storage`] backend.
///
/// The user id always comes from the caller's verified claim; the ledger
/// never accepts one from a request body.
pub struct RatingLedger<'a, S> {
    storage: &'a S,
}

impl<'a, S: Storage> RatingLedger<'a, S> {
    pub const fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Record or overwrite the user's rating for a store.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::OutOfRange`] for a value outside 1..=5 and
    /// [`LedgerError::UnknownStore`] for an absent store id.
    pub async fn submit(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: i16,
    ) -> Result<RatingValue, LedgerError> {
        let value = RatingValue::new(value)?;

        if self.storage.store_by_id(store_id).await?.is_none() {
            return Err(LedgerError::UnknownStore);
        }

        self.storage.upsert_rating(user_id, store_id, value).await?;
        Ok(value)
    }

    /// The user's own rating for a store, if any.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the query fails.
    pub async fn rating_for(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<RatingValue>, LedgerError> {
        Ok(self.storage.rating_for(user_id, store_id).await?)
    }

    /// Everyone who rated a store, with their values.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the query fails.
    pub async fn raters_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<RaterEntry>, LedgerError> {
        Ok(self.storage.raters_for_store(store_id).await?)
    }
}
