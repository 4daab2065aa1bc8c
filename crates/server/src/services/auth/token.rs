//! Session token issuing and verification.
//!
//! Tokens are HS256 JWTs carrying the subject id, email, and role, expiring
//! after 24 hours. They are opaque to callers; every claim a handler acts on
//! comes from a verified token, never from the request body.
//!
//! A password change does not revoke already-issued tokens; the expiry
//! bounds that staleness window.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storerate_core::{Email, Role, UserId};

use crate::models::User;

/// Token lifetime: one day.
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// The decoded, verified payload of a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user's id.
    pub sub: UserId,
    /// The user's email at issue time.
    pub email: Email,
    /// The user's role at issue time.
    pub role: Role,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// A token that failed verification.
///
/// Expired and tampered tokens are indistinguishable to the caller; absence
/// of a token is a separate condition handled by the extractor.
#[derive(Debug, Error)]
#[error("invalid or expired token")]
pub struct InvalidToken;

/// Signing a new token failed (an internal condition).
#[derive(Debug, Error)]
#[error("failed to sign token")]
pub struct TokenCreationFailed;

/// Issues and verifies session tokens with a server-held secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenIssuer {
    /// Create an issuer with the standard 24-hour expiry.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self::with_ttl(secret, TOKEN_TTL_SECS)
    }

    /// Create an issuer with a custom expiry, in seconds.
    #[must_use]
    pub fn with_ttl(secret: &SecretString, ttl_secs: i64) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret_bytes),
            decoding: DecodingKey::from_secret(secret_bytes),
            validation: Validation::default(),
            ttl_secs,
        }
    }

    /// Issue a signed token for a user.
    ///
    /// # Errors
    ///
    /// Returns [`TokenCreationFailed`] if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenCreationFailed> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now,
            exp: now + self.ttl_secs,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| TokenCreationFailed)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidToken`] for tampered, expired, or malformed tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| InvalidToken)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use secrecy::SecretString;
    use storerate_core::{Email, Role, UserId};

    use super::*;

    fn secret() -> SecretString {
        SecretString::from("kY8$wQ2nB5vM9zR3jL6pT1xD4hF7gC0s")
    }

    fn sample_user() -> User {
        User {
            id: UserId::new(7),
            name: "Asha Rao".to_owned(),
            email: Email::parse("asha@example.com").unwrap(),
            address: "12 Hill Road".to_owned(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let issuer = TokenIssuer::new(&secret());
        let token = issuer.issue(&sample_user()).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, UserId::new(7));
        assert_eq!(claims.email.as_str(), "asha@example.com");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let issuer = TokenIssuer::new(&secret());
        let token = issuer.issue(&sample_user()).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push('x');
        assert!(issuer.verify(&tampered).is_err());
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issuer = TokenIssuer::new(&secret());
        let token = issuer.issue(&sample_user()).unwrap();

        let other = TokenIssuer::new(&SecretString::from(
            "zQ4&nV7mK1bX8cJ3rW6tY9dG2fH5sL0p",
        ));
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_invalid() {
        // Well past the default validation leeway.
        let issuer = TokenIssuer::with_ttl(&secret(), -3600);
        let token = issuer.issue(&sample_user()).unwrap();
        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_is_invalid() {
        let issuer = TokenIssuer::new(&secret());
        assert!(issuer.verify("not-a-token").is_err());
    }
}
