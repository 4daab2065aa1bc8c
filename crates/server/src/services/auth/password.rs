//! Password hashing and the credential policy.
//!
//! Hashes are Argon2id with a per-password random salt. Verification goes
//! through argon2's constant-time comparison; stored hashes are never
//! compared as plain strings.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
const MAX_PASSWORD_LENGTH: usize = 16;

/// The fixed set of accepted special characters.
const SPECIAL_CHARACTERS: &str = "@$!%*?&";

/// A password that violates the strength policy.
///
/// Each variant carries enough context for a field-level client message;
/// the input is never truncated or coerced into compliance.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,
    #[error("password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("password must contain at least one special character ({SPECIAL_CHARACTERS})")]
    MissingSpecial,
}

/// Hashing failed (an internal condition, not a caller mistake).
#[derive(Debug, Error)]
#[error("failed to hash password")]
pub struct HashingFailed;

/// Validate a password against the strength policy:
/// 8-16 characters, at least one uppercase letter, at least one character
/// from [`SPECIAL_CHARACTERS`].
///
/// # Errors
///
/// Returns the first [`PolicyError`] the password violates.
pub fn validate_policy(password: &str) -> Result<(), PolicyError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(PolicyError::TooShort);
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(PolicyError::TooLong);
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(PolicyError::MissingUppercase);
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        return Err(PolicyError::MissingSpecial);
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns [`HashingFailed`] if the hasher rejects the input.
pub fn hash_password(password: &str) -> Result<String, HashingFailed> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| HashingFailed)
}

/// Verify a password against a stored hash.
///
/// Returns `false` for a mismatch and for a malformed stored hash alike;
/// callers treat both as invalid credentials.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
