//! Authentication: credentials, session tokens, and role-based access.

use thiserror::Error;

use storerate_core::{Email, EmailError, UserId};

use crate::db::{RepositoryError, Storage};
use crate::models::User;

pub mod access;
pub mod password;
pub mod token;

pub use access::{AccessDenied, Operation, authorize};
pub use password::{HashingFailed, PolicyError, hash_password, validate_policy, verify_password};
pub use token::{Claims, InvalidToken, TokenCreationFailed, TokenIssuer};

/// Errors from the authentication service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The submitted email is not a valid address.
    #[error(transparent)]
    InvalidEmail(#[from] EmailError),

    /// The new password violates the strength policy.
    #[error(transparent)]
    WeakPassword(#[from] PolicyError),

    /// Unknown email or wrong password. Deliberately uniform so login
    /// attempts cannot probe which emails are registered.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Hashing the password failed.
    #[error(transparent)]
    PasswordHash(#[from] HashingFailed),

    /// Signing the session token failed.
    #[error(transparent)]
    TokenCreation(#[from] TokenCreationFailed),

    /// The storage layer failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Login and password maintenance over a [`Storage`] backend.
pub struct AuthService<'a, S> {
    storage: &'a S,
    tokens: &'a TokenIssuer,
}

impl<'a, S: Storage> AuthService<'a, S> {
    pub const fn new(storage: &'a S, tokens: &'a TokenIssuer) -> Self {
        Self { storage, tokens }
    }

    /// Authenticate by email and password, returning the user and a fresh
    /// session token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] for a malformed address and
    /// [`AuthError::InvalidCredentials`] for an unknown email or a wrong
    /// password, without distinguishing the two.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let Some((user, hash)) = self.storage.user_credential(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        Ok((user, token))
    }

    /// Replace the caller's password after validating the strength policy.
    ///
    /// Already-issued tokens stay valid until they expire.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::WeakPassword`] when the new password violates
    /// the policy.
    pub async fn change_password(
        &self,
        user_id: UserId,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_policy(new_password)?;
        let hash = hash_password(new_password)?;
        self.storage.set_password_hash(user_id, &hash).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use storerate_core::Role;

    use super::*;
    use crate::db::memory::MemStorage;
    use crate::models::NewUser;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&SecretString::from("kY8$wQ2nB5vM9zR3jL6pT1xD4hF7gC0s"))
    }

    async fn seed_user(storage: &MemStorage, email: &str, password: &str) -> User {
        storage
            .insert_user(&NewUser {
                name: "Asha Rao".to_owned(),
                email: Email::parse(email).unwrap(),
                address: "12 Hill Road".to_owned(),
                password_hash: hash_password(password).unwrap(),
                role: Role::User,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let storage = MemStorage::new();
        let tokens = issuer();
        let seeded = seed_user(&storage, "asha@example.com", "Valid$Pass1").await;

        let auth = AuthService::new(&storage, &tokens);
        let (user, token) = auth.login("asha@example.com", "Valid$Pass1").await.unwrap();

        assert_eq!(user.id, seeded.id);
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, seeded.id);
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_uniform() {
        let storage = MemStorage::new();
        let tokens = issuer();
        seed_user(&storage, "asha@example.com", "Valid$Pass1").await;

        let auth = AuthService::new(&storage, &tokens);
        let err = auth
            .login("asha@example.com", "Wrong$Pass1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_uniform() {
        let storage = MemStorage::new();
        let tokens = issuer();

        let auth = AuthService::new(&storage, &tokens);
        let err = auth
            .login("nobody@example.com", "Valid$Pass1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_change_password_rejects_weak() {
        let storage = MemStorage::new();
        let tokens = issuer();
        let user = seed_user(&storage, "asha@example.com", "Valid$Pass1").await;

        let auth = AuthService::new(&storage, &tokens);
        let err = auth.change_password(user.id, "weak").await.unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[tokio::test]
    async fn test_change_password_rotates_credential() {
        let storage = MemStorage::new();
        let tokens = issuer();
        let user = seed_user(&storage, "asha@example.com", "Valid$Pass1").await;

        let auth = AuthService::new(&storage, &tokens);
        auth.change_password(user.id, "Fresh$Pass2").await.unwrap();

        assert!(matches!(
            auth.login("asha@example.com", "Valid$Pass1")
                .await
                .unwrap_err(),
            AuthError::InvalidCredentials
        ));
        auth.login("asha@example.com", "Fresh$Pass2").await.unwrap();
    }
}
