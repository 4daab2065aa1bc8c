//! Domain types.
//!
//! These types represent validated domain objects separate from request and
//! response wire shapes, which live next to their route handlers.

pub mod rating;
pub mod store;
pub mod user;

pub use rating::{OwnerDashboard, PlatformCounts, RaterEntry};
pub use store::{NewStore, Store, StoreFilter, StoreListing, StoreWithRating};
pub use user::{NewUser, User, UserDetail, UserFilter, UserSummary};
