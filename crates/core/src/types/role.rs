//! Platform roles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing a [`Role`] from a string.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown role (expected admin, user, or store-owner)")]
pub struct RoleParseError;

/// A platform role, determining the permitted operation set.
///
/// Roles form a closed set; there is no hierarchy. An admin cannot submit
/// ratings and a store-owner cannot create stores.
///
/// Stored in the database as text (`admin`, `user`, `store-owner`) and
/// serialized the same way in JSON and token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Manages accounts and stores; sees platform-wide aggregates.
    Admin,
    /// Browses stores and submits one rating per store.
    #[default]
    User,
    /// Views aggregated feedback for the store matching their email.
    StoreOwner,
}

impl Role {
    /// Returns the canonical text form (`admin`, `user`, `store-owner`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::StoreOwner => "store-owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "store-owner" => Ok(Self::StoreOwner),
            _ => Err(RoleParseError),
        }
    }
}

// SQLx support (with postgres feature): roles are stored as TEXT.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_text() {
        for role in [Role::Admin, Role::User, Role::StoreOwner] {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert!("superuser".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_kebab_case() {
        let json = serde_json::to_string(&Role::StoreOwner).unwrap();
        assert_eq!(json, "\"store-owner\"");

        let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, Role::Admin);
    }

    #[test]
    fn test_default_is_user() {
        // Self-registration without an explicit role falls back to this.
        assert_eq!(Role::default(), Role::User);
    }
}
