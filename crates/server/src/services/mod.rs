//! Business logic, independent of the HTTP layer.

pub mod aggregation;
pub mod auth;
pub mod directory;
pub mod ratings;

pub use aggregation::{AggregationEngine, AggregationError};
pub use auth::{AuthError, AuthService};
pub use directory::{DirectoryError, DirectoryService, StoreInput, UserInput};
pub use ratings::{LedgerError, RatingLedger};
