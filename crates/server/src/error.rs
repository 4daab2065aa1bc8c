//! The API error taxonomy and its HTTP mapping.
//!
//! Service errors converge here. Client mistakes map to 4xx with a
//! field-level message; server-side failures are logged and reported, and
//! the client sees only a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::{AccessDenied, AuthError, InvalidToken};
use crate::services::{AggregationError, DirectoryError, LedgerError};

/// Error as surfaced to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or out-of-range input. Always carries a message the client
    /// can show next to the offending field.
    #[error("{0}")]
    Validation(String),

    /// A uniqueness rule rejected the write (duplicate email).
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials or a bad token. The message is uniform so clients
    /// cannot probe which emails are registered.
    #[error("{0}")]
    Authentication(String),

    /// The caller's role lacks the operation.
    #[error("access denied")]
    Authorization,

    /// The caller is entitled to know the resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A retryable storage condition (pool exhaustion, connection loss).
    #[error("service temporarily unavailable")]
    Transient,

    /// An unexpected failure; the detail stays server-side.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        if e.is_transient() {
            return Self::Transient;
        }
        match e {
            RepositoryError::Conflict(message) => Self::Conflict(message),
            RepositoryError::NotFound => Self::NotFound("not found".to_owned()),
            RepositoryError::Database(db) => Self::Internal(db.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidEmail(inner) => Self::Validation(inner.to_string()),
            AuthError::WeakPassword(inner) => Self::Validation(inner.to_string()),
            AuthError::InvalidCredentials => Self::Authentication(e.to_string()),
            AuthError::PasswordHash(inner) => Self::Internal(inner.to_string()),
            AuthError::TokenCreation(inner) => Self::Internal(inner.to_string()),
            AuthError::Repository(inner) => inner.into(),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::EmptyName
            | DirectoryError::EmptyAddress
            | DirectoryError::InvalidEmail(_)
            | DirectoryError::WeakPassword(_) => Self::Validation(e.to_string()),
            DirectoryError::PasswordHash(inner) => Self::Internal(inner.to_string()),
            DirectoryError::UserNotFound => Self::NotFound(e.to_string()),
            DirectoryError::Repository(inner) => inner.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            // An absent store is a bad submission target, not a resource
            // the rater is entitled to probe for.
            LedgerError::OutOfRange(_) | LedgerError::UnknownStore => {
                Self::Validation(e.to_string())
            }
            LedgerError::Repository(inner) => inner.into(),
        }
    }
}

impl From<AggregationError> for ApiError {
    fn from(e: AggregationError) -> Self {
        match e {
            // The owner is entitled to know their own store is missing.
            AggregationError::NoOwnedStore => Self::NotFound(e.to_string()),
            AggregationError::Repository(inner) => inner.into(),
        }
    }
}

impl From<AccessDenied> for ApiError {
    fn from(_: AccessDenied) -> Self {
        Self::Authorization
    }
}

impl From<InvalidToken> for ApiError {
    fn from(e: InvalidToken) -> Self {
        Self::Authentication(e.to_string())
    }
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Transient => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                sentry::capture_message(detail, sentry::Level::Error);
                "internal server error".to_owned()
            }
            Self::Transient => {
                tracing::warn!("transient storage failure");
                self.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Authentication("no".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Authorization.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Transient.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_transient_repository_errors_are_retryable() {
        let err: ApiError = RepositoryError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, ApiError::Transient));
    }

    #[test]
    fn test_conflict_flows_through() {
        let err: ApiError = RepositoryError::Conflict("email already registered".into()).into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_unknown_store_is_a_validation_error() {
        let err: ApiError = LedgerError::UnknownStore.into();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
