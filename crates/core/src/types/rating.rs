//! Rating value type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a rating value falls outside 1-5.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between {} and {} (got {value})", RatingValue::MIN, RatingValue::MAX)]
pub struct RatingOutOfRange {
    /// The rejected value.
    pub value: i16,
}

/// A store rating submitted by a user.
///
/// Always within [1, 5]; construction validates the range so a `RatingValue`
/// in a ledger row or an aggregate is valid by construction.
///
/// ```
/// use storerate_core::RatingValue;
///
/// assert!(RatingValue::new(4).is_ok());
/// assert!(RatingValue::new(0).is_err());
/// assert!(RatingValue::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RatingValue(i16);

impl RatingValue {
    /// Lowest accepted rating.
    pub const MIN: i16 = 1;
    /// Highest accepted rating.
    pub const MAX: i16 = 5;

    /// Create a rating, rejecting values outside [1, 5].
    ///
    /// # Errors
    ///
    /// Returns [`RatingOutOfRange`] when the value is outside the range.
    pub const fn new(value: i16) -> Result<Self, RatingOutOfRange> {
        if value >= Self::MIN && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(RatingOutOfRange { value })
        }
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        self.0
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i16> for RatingValue {
    type Error = RatingOutOfRange;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for RatingValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i16::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

// SQLx support (with postgres feature): stored as SMALLINT.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for RatingValue {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i16 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for RatingValue {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i16 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(raw)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for RatingValue {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i16 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
