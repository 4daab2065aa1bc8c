//! User and store directory: creation, listing, and filtered lookup.
//!
//! The directory owns identity uniqueness. Duplicate emails are checked
//! before insertion, but the storage layer's unique constraint is the
//! authoritative guard; a concurrent duplicate still surfaces as a conflict.

use thiserror::Error;

use storerate_core::{Email, EmailError, Role, StoreId, UserId};

use super::auth::{self, HashingFailed, PolicyError};
use crate::db::{RepositoryError, Storage};
use crate::models::{
    NewStore, NewUser, Store, StoreFilter, StoreWithRating, User, UserDetail, UserFilter,
};

/// Errors from the directory service.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("address must not be empty")]
    EmptyAddress,

    #[error(transparent)]
    InvalidEmail(#[from] EmailError),

    #[error(transparent)]
    WeakPassword(#[from] PolicyError),

    #[error(transparent)]
    PasswordHash(#[from] HashingFailed),

    /// The looked-up user id has no row.
    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Raw, unvalidated input for creating a user.
pub struct UserInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub address: &'a str,
    pub password: &'a str,
    pub role: Role,
}

/// Raw, unvalidated input for creating a store.
pub struct StoreInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub address: &'a str,
}

/// Directory operations over a [`Storage`] backend.
pub struct DirectoryService<'a, S> {
    storage: &'a S,
}

impl<'a, S: Storage> DirectoryService<'a, S> {
    pub const fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Validate and create a user account.
    ///
    /// # Errors
    ///
    /// Returns a validation variant for bad input, or
    /// [`RepositoryError::Conflict`] (wrapped) when the email is already
    /// registered.
    pub async fn create_user(&self, input: UserInput<'_>) -> Result<User, DirectoryError> {
        if input.name.trim().is_empty() {
            return Err(DirectoryError::EmptyName);
        }
        if input.address.trim().is_empty() {
            return Err(DirectoryError::EmptyAddress);
        }
        let email = Email::parse(input.email)?;
        auth::validate_policy(input.password)?;

        // Early duplicate check for a friendlier error; the unique
        // constraint still catches a concurrent insert.
        if self.storage.user_by_email(&email).await?.is_some() {
            return Err(RepositoryError::Conflict("email already registered".to_owned()).into());
        }

        let password_hash = auth::hash_password(input.password)?;
        let user = self
            .storage
            .insert_user(&NewUser {
                name: input.name.trim().to_owned(),
                email,
                address: input.address.trim().to_owned(),
                password_hash,
                role: input.role,
            })
            .await?;

        Ok(user)
    }

    /// Validate and register a store.
    ///
    /// # Errors
    ///
    /// Returns a validation variant for bad input, or a conflict when the
    /// store email is already registered.
    pub async fn create_store(&self, input: StoreInput<'_>) -> Result<Store, DirectoryError> {
        if input.name.trim().is_empty() {
            return Err(DirectoryError::EmptyName);
        }
        if input.address.trim().is_empty() {
            return Err(DirectoryError::EmptyAddress);
        }
        let email = Email::parse(input.email)?;

        let store = self
            .storage
            .insert_store(&NewStore {
                name: input.name.trim().to_owned(),
                email,
                address: input.address.trim().to_owned(),
            })
            .await?;

        Ok(store)
    }

    /// List users matching a conjunction of optional filters.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the query fails.
    pub async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, DirectoryError> {
        Ok(self.storage.list_users(filter).await?)
    }

    /// List stores matching a filter, each with its current average rating.
    ///
    /// # Errors
    ///
    /// Returns a repository error if any query fails; no partial list is
    /// returned.
    pub async fn list_stores(
        &self,
        filter: &StoreFilter,
    ) -> Result<Vec<StoreWithRating>, DirectoryError> {
        let stores = self.storage.list_stores(filter).await?;
        let ids: Vec<StoreId> = stores.iter().map(|s| s.id).collect();
        let averages = self.storage.average_ratings(&ids).await?;

        Ok(stores
            .into_iter()
            .map(|store| {
                let average_rating = averages.get(&store.id).copied().unwrap_or(0.0);
                StoreWithRating {
                    id: store.id,
                    name: store.name,
                    email: store.email,
                    address: store.address,
                    average_rating,
                }
            })
            .collect())
    }

    /// Look up one user by id, augmented with their store's average rating
    /// when the user is a store owner.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::UserNotFound`] when the id has no row.
    pub async fn user_detail(&self, id: UserId) -> Result<UserDetail, DirectoryError> {
        let user = self
            .storage
            .user_by_id(id)
            .await?
            .ok_or(DirectoryError::UserNotFound)?;

        // Owner association is by email equality, not a foreign key.
        let rating = if user.role == Role::StoreOwner {
            match self.storage.store_by_email(&user.email).await? {
                Some(store) => Some(self.storage.average_rating(store.id).await?),
                None => Some(0.0),
            }
        } else {
            None
        };

        Ok(UserDetail {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            role: user.role,
            rating,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use storerate_core::RatingValue;

    use super::*;
    use crate::db::memory::MemStorage;

    fn user_input<'a>(name: &'a str, email: &'a str, role: Role) -> UserInput<'a> {
        UserInput {
            name,
            email,
            address: "1 Main St",
            password: "Valid$Pass1",
            role,
        }
    }

    #[tokio::test]
    async fn test_create_user_rejects_blank_fields() {
        let storage = MemStorage::new();
        let directory = DirectoryService::new(&storage);

        let err = directory
            .create_user(user_input("  ", "a@x.com", Role::User))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::EmptyName));

        let err = directory
            .create_user(UserInput {
                address: " ",
                ..user_input("Asha Rao", "a@x.com", Role::User)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::EmptyAddress));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_and_keeps_first() {
        let storage = MemStorage::new();
        let directory = DirectoryService::new(&storage);

        let first = directory
            .create_user(user_input("Asha Rao", "asha@example.com", Role::User))
            .await
            .unwrap();

        let err = directory
            .create_user(user_input("Impostor", "asha@example.com", Role::User))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DirectoryError::Repository(RepositoryError::Conflict(_))
        ));

        let kept = storage
            .user_by_email(&Email::parse("asha@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.id, first.id);
        assert_eq!(kept.name, "Asha Rao");
    }

    #[tokio::test]
    async fn test_list_users_filters_are_conjunctive() {
        let storage = MemStorage::new();
        let directory = DirectoryService::new(&storage);

        directory
            .create_user(user_input("Asha Rao", "asha@example.com", Role::User))
            .await
            .unwrap();
        directory
            .create_user(user_input("Arjun Mehta", "arjun@example.com", Role::Admin))
            .await
            .unwrap();

        let hits = directory
            .list_users(&UserFilter {
                name: Some("ASH".to_owned()),
                role: Some(Role::User),
                ..UserFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Asha Rao");

        let none = directory
            .list_users(&UserFilter {
                name: Some("ash".to_owned()),
                role: Some(Role::Admin),
                ..UserFilter::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_stores_carries_averages() {
        let storage = MemStorage::new();
        let directory = DirectoryService::new(&storage);

        let store = directory
            .create_store(StoreInput {
                name: "Acme",
                email: "acme@x.com",
                address: "1 Main St",
            })
            .await
            .unwrap();
        let rater = directory
            .create_user(user_input("Asha Rao", "asha@example.com", Role::User))
            .await
            .unwrap();
        storage
            .upsert_rating(rater.id, store.id, RatingValue::new(4).unwrap())
            .await
            .unwrap();

        let listed = directory
            .list_stores(&StoreFilter::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert!((listed[0].average_rating - 4.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_user_detail_augments_owner_with_store_average() {
        let storage = MemStorage::new();
        let directory = DirectoryService::new(&storage);

        let store = directory
            .create_store(StoreInput {
                name: "Acme",
                email: "acme@x.com",
                address: "1 Main St",
            })
            .await
            .unwrap();
        let owner = directory
            .create_user(user_input("Owen Price", "acme@x.com", Role::StoreOwner))
            .await
            .unwrap();
        let rater = directory
            .create_user(user_input("Asha Rao", "asha@example.com", Role::User))
            .await
            .unwrap();
        storage
            .upsert_rating(rater.id, store.id, RatingValue::new(5).unwrap())
            .await
            .unwrap();

        let detail = directory.user_detail(owner.id).await.unwrap();
        assert_eq!(detail.rating, Some(5.0));

        let plain = directory.user_detail(rater.id).await.unwrap();
        assert_eq!(plain.rating, None);
    }

    #[tokio::test]
    async fn test_user_detail_missing_id_is_not_found() {
        let storage = MemStorage::new();
        let directory = DirectoryService::new(&storage);

        let err = directory.user_detail(UserId::new(99)).await.unwrap_err();
        assert!(matches!(err, DirectoryError::UserNotFound));
    }
}
