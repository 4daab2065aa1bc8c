//! Bearer-token extraction for protected routes.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::services::auth::Claims;
use crate::state::AppState;

/// Extractor that verifies the `Authorization: Bearer` token and yields the
/// caller's claims.
///
/// An absent token is reported distinctly from an invalid or expired one;
/// both reject with 401 before the handler body runs.
pub struct AuthClaims(pub Claims);

impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Authentication("missing authorization token".to_owned()))?;

        let claims = state.tokens().verify(token)?;
        Ok(Self(claims))
    }
}
