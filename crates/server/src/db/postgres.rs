//! `PostgreSQL` implementation of the [`Storage`] query interface.
//!
//! Queries use the sqlx runtime API. Uniqueness violations are translated to
//! [`RepositoryError::Conflict`] so callers can distinguish "email taken"
//! from a genuine failure; the rating upsert leans on the
//! `(user_id, store_id)` unique key via `ON CONFLICT DO UPDATE`, so the
//! constraint itself serializes concurrent submissions.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};

use storerate_core::{Email, RatingValue, StoreId, UserId};

use super::{RepositoryError, Storage, like_pattern};
use crate::models::{
    NewStore, NewUser, PlatformCounts, RaterEntry, Store, StoreFilter, User, UserFilter,
};

const USER_COLUMNS: &str = "id, name, email, address, role, created_at";
const STORE_COLUMNS: &str = "id, name, email, address, created_at";

/// Storage backed by a `PostgreSQL` pool.
pub struct PgStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> PgStorage<'a> {
    /// Create a new `PostgreSQL` storage handle.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-constraint violation to `Conflict`, everything else to
/// `Database`.
fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

#[async_trait]
impl Storage for PgStorage<'_> {
    async fn insert_user(&self, new: &NewUser) -> Result<User, RepositoryError> {
        let query = format!(
            "INSERT INTO users (name, email, address, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(&new.name)
            .bind(new.email.as_str())
            .bind(&new.address)
            .bind(&new.password_hash)
            .bind(new.role)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "email already registered"))
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    async fn user_credential(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let query = format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
        );

        let row = sqlx::query_as::<_, UserWithHash>(&query)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, RepositoryError> {
        let mut qb = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE 1=1"));

        if let Some(name) = &filter.name {
            qb.push(" AND name ILIKE ").push_bind(like_pattern(name));
        }
        if let Some(email) = &filter.email {
            qb.push(" AND email ILIKE ").push_bind(like_pattern(email));
        }
        if let Some(address) = &filter.address {
            qb.push(" AND address ILIKE ")
                .push_bind(like_pattern(address));
        }
        if let Some(role) = filter.role {
            qb.push(" AND role = ").push_bind(role);
        }
        qb.push(" ORDER BY id");

        let users = qb.build_query_as::<User>().fetch_all(self.pool).await?;

        Ok(users)
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(hash)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn insert_store(&self, new: &NewStore) -> Result<Store, RepositoryError> {
        let query = format!(
            "INSERT INTO stores (name, email, address) \
             VALUES ($1, $2, $3) \
             RETURNING {STORE_COLUMNS}"
        );

        sqlx::query_as::<_, Store>(&query)
            .bind(&new.name)
            .bind(new.email.as_str())
            .bind(&new.address)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "store email already registered"))
    }

    async fn store_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let query = format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1");

        let store = sqlx::query_as::<_, Store>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(store)
    }

    async fn store_by_email(&self, email: &Email) -> Result<Option<Store>, RepositoryError> {
        let query = format!("SELECT {STORE_COLUMNS} FROM stores WHERE email = $1");

        let store = sqlx::query_as::<_, Store>(&query)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        Ok(store)
    }

    async fn list_stores(&self, filter: &StoreFilter) -> Result<Vec<Store>, RepositoryError> {
        let mut qb = QueryBuilder::new(format!("SELECT {STORE_COLUMNS} FROM stores WHERE 1=1"));

        if let Some(name) = &filter.name {
            qb.push(" AND name ILIKE ").push_bind(like_pattern(name));
        }
        if let Some(email) = &filter.email {
            qb.push(" AND email ILIKE ").push_bind(like_pattern(email));
        }
        if let Some(address) = &filter.address {
            qb.push(" AND address ILIKE ")
                .push_bind(like_pattern(address));
        }
        qb.push(" ORDER BY id");

        let stores = qb.build_query_as::<Store>().fetch_all(self.pool).await?;

        Ok(stores)
    }

    async fn upsert_rating(
        &self,
        user_id: UserId,
        store_id: StoreId,
        value: RatingValue,
    ) -> Result<(), RepositoryError> {
        // The unique key is the source of truth: a concurrent insert for the
        // same pair resolves to an update here, never a second row.
        sqlx::query(
            "INSERT INTO ratings (user_id, store_id, rating) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, store_id) DO UPDATE SET rating = EXCLUDED.rating",
        )
        .bind(user_id)
        .bind(store_id)
        .bind(value)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    async fn rating_for(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<RatingValue>, RepositoryError> {
        let rating = sqlx::query_scalar::<_, RatingValue>(
            "SELECT rating FROM ratings WHERE user_id = $1 AND store_id = $2",
        )
        .bind(user_id)
        .bind(store_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(rating)
    }

    async fn ratings_by_user(
        &self,
        user_id: UserId,
    ) -> Result<HashMap<StoreId, RatingValue>, RepositoryError> {
        let rows = sqlx::query_as::<_, (StoreId, RatingValue)>(
            "SELECT store_id, rating FROM ratings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn raters_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<RaterEntry>, RepositoryError> {
        let raters = sqlx::query_as::<_, RaterEntry>(
            "SELECT u.id AS user_id, u.name, u.email, r.rating \
             FROM ratings r \
             JOIN users u ON u.id = r.user_id \
             WHERE r.store_id = $1 \
             ORDER BY u.id",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(raters)
    }

    async fn average_rating(&self, store_id: StoreId) -> Result<f64, RepositoryError> {
        let average = sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(AVG(rating)::float8, 0) FROM ratings WHERE store_id = $1",
        )
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        Ok(average)
    }

    async fn average_ratings(
        &self,
        store_ids: &[StoreId],
    ) -> Result<HashMap<StoreId, f64>, RepositoryError> {
        let ids: Vec<i32> = store_ids.iter().map(|id| id.as_i32()).collect();

        let rows = sqlx::query_as::<_, (StoreId, f64)>(
            "SELECT store_id, AVG(rating)::float8 \
             FROM ratings \
             WHERE store_id = ANY($1) \
             GROUP BY store_id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn counts(&self) -> Result<PlatformCounts, RepositoryError> {
        // One statement so the totals are a consistent snapshot; a failure
        // here fails the whole read, never a partial one.
        let counts = sqlx::query_as::<_, PlatformCounts>(
            "SELECT (SELECT COUNT(*) FROM users)   AS total_users, \
                    (SELECT COUNT(*) FROM stores)  AS total_stores, \
                    (SELECT COUNT(*) FROM ratings) AS total_ratings",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }
}

/// Row shape for credential lookups: the user plus their password hash.
#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}
