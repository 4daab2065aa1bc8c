//! In-memory [`Storage`] used by service tests.
//!
//! Mirrors the production semantics the services rely on: email uniqueness
//! rejects with `Conflict`, and the rating upsert keeps exactly one row per
//! `(user, store)` pair.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use storerate_core::{Email, RatingValue, StoreId, UserId};

use super::{RepositoryError, Storage};
use crate::models::{
    NewStore, NewUser, PlatformCounts, RaterEntry, Store, StoreFilter, User, UserFilter,
};

#[derive(Default)]
struct Inner {
    users: Vec<(User, String)>,
    stores: Vec<Store>,
    ratings: HashMap<(UserId, StoreId), RatingValue>,
    next_user_id: i32,
    next_store_id: i32,
}

/// In-memory storage double.
#[derive(Default)]
pub struct MemStorage {
    inner: Mutex<Inner>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_fragment(value: &str, fragment: Option<&String>) -> bool {
    fragment.is_none_or(|f| value.to_lowercase().contains(&f.to_lowercase()))
}

#[async_trait]
impl Storage for MemStorage {
    async fn insert_user(&self, new: &NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.inner.lock().expect("lock poisoned");

        if inner.users.iter().any(|(u, _)| u.email == new.email) {
            return Err(RepositoryError::Conflict(
                "email already registered".to_owned(),
            ));
        }

        inner.next_user_id += 1;
        let user = User {
            id: UserId::new(inner.next_user_id),
            name: new.name.clone(),
            email: new.email.clone(),
            address: new.address.clone(),
            role: new.role,
            created_at: Utc::now(),
        };
        inner.users.push((user.clone(), new.password_hash.clone()));

        Ok(user)
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner
            .users
            .iter()
            .find(|(u, _)| &u.email == email)
            .map(|(u, _)| u.clone()))
    }

    async fn user_credential(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner
            .users
            .iter()
            .find(|(u, _)| &u.email == email)
            .cloned())
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner
            .users
            .iter()
            .map(|(u, _)| u)
            .filter(|u| {
                matches_fragment(&u.name, filter.name.as_ref())
                    && matches_fragment(u.email.as_str(), filter.email.as_ref())
                    && matches_fragment(&u.address, filter.address.as_ref())
                    && filter.role.is_none_or(|r| u.role == r)
            })
            .cloned()
            .collect())
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        let entry = inner
            .users
            .iter_mut()
            .find(|(u, _)| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        entry.1 = hash.to_owned();
        Ok(())
    }

    async fn insert_store(&self, new: &NewStore) -> Result<Store, RepositoryError> {
        let mut inner = self.inner.lock().expect("lock poisoned");

        if inner.stores.iter().any(|s| s.email == new.email) {
            return Err(RepositoryError::Conflict(
                "store email already registered".to_owned(),
            ));
        }

        inner.next_store_id += 1;
        let store = Store {
            id: StoreId::new(inner.next_store_id),
            name: new.name.clone(),
            email: new.email.clone(),
            address: new.address.clone(),
            created_at: Utc::now(),
        };
        inner.stores.push(store.clone());

        Ok(store)
    }

    async fn store_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner.stores.iter().find(|s| s.id == id).cloned())
    }

    async fn store_by_email(&self, email: &Email) -> Result<Option<Store>, RepositoryError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner.stores.iter().find(|s| &s.email == email).cloned())
    }

    async fn list_stores(&self, filter: &StoreFilter) -> Result<Vec<Store>, RepositoryError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner
            .stores
            .iter()
            .filter(|s| {
                matches_fragment(&s.name, filter.name.as_ref())
                    && matches_fragment(s.email.as_str(), filter.email.as_ref())
                    && matches_fragment(&s.address, filter.address.as_ref())
            })
            .cloned()
            .collect())
    }

    async fn upsert_rating(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.ratings.insert((user_id, store_id), value);
        Ok(())
    }

    async fn rating_for(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<RatingValue>, RepositoryError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner.ratings.get(&(user_id, store_id)).copied())
    }

    async fn ratings_by_user(
        &self,
        user_id: UserId,
    ) -> Result<HashMap<StoreId, RatingValue>, RepositoryError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner
            .ratings
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .map(|((_, sid), value)| (*sid, *value))
            .collect())
    }

    async fn raters_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<RaterEntry>, RepositoryError> {
        let inner = self.inner.lock().expect("lock poisoned");
        let mut raters: Vec<RaterEntry> = inner
            .ratings
            .iter()
            .filter(|((_, sid), _)| *sid == store_id)
            .filter_map(|((uid, _), value)| {
                inner
                    .users
                    .iter()
                    .find(|(u, _)| u.id == *uid)
                    .map(|(u, _)| RaterEntry {
                        user_id: u.id,
                        name: u.name.clone(),
                        email: u.email.clone(),
                        rating: *value,
                    })
            })
            .collect();
        raters.sort_by_key(|r| r.user_id);
        Ok(raters)
    }

    async fn average_rating(&self, store_id: StoreId) -> Result<f64, RepositoryError> {
        let inner = self.inner.lock().expect("lock poisoned");
        let values: Vec<f64> = inner
            .ratings
            .iter()
            .filter(|((_, sid), _)| *sid == store_id)
            .map(|(_, value)| f64::from(value.as_i16()))
            .collect();

        if values.is_empty() {
            return Ok(0.0);
        }
        #[allow(clippy::cast_precision_loss)]
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }

    async fn average_ratings(
        &self,
        store_ids: &[StoreId],
    ) -> Result<HashMap<StoreId, f64>, RepositoryError> {
        let mut averages = HashMap::new();
        for &store_id in store_ids {
            let average = self.average_rating(store_id).await?;
            let has_ratings = {
                let inner = self.inner.lock().expect("lock poisoned");
                inner.ratings.keys().any(|(_, sid)| *sid == store_id)
            };
            if has_ratings {
                averages.insert(store_id, average);
            }
        }
        Ok(averages)
    }

    async fn counts(&self) -> Result<PlatformCounts, RepositoryError> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(PlatformCounts {
            total_users: inner.users.len() as i64,
            total_stores: inner.stores.len() as i64,
            total_ratings: inner.ratings.len() as i64,
        })
    }
}
