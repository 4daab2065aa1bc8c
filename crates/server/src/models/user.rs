//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storerate_core::{Email, Role, UserId};

/// A platform user (domain type).
///
/// The password hash is deliberately not part of this type; credential
/// lookups return it separately so it can never leak through serialization.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address (unique across the platform).
    pub email: Email,
    /// Postal address.
    pub address: String,
    /// Platform role.
    pub role: Role,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a user. The password is already hashed by the time this
/// struct exists.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub address: String,
    pub password_hash: String,
    pub role: Role,
}

/// Conjunction of optional user list predicates.
///
/// Text fields match as case-insensitive substrings; role matches exactly.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

/// Public user summary, safe for client responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Admin view of a single user.
///
/// For store-owners the owned store's average rating is attached (0 when the
/// store has no ratings yet); for other roles `rating` is absent.
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}
