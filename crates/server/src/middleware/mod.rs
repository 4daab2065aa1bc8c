//! Request-level plumbing shared across routes.

pub mod auth;

pub use auth::AuthClaims;
