//! Role-based operation authorization.
//!
//! A static capability table maps each role to the operations it may
//! perform. Every protected handler asks [`authorize`] exactly once before
//! touching storage, so a denied request does no work and leaks nothing
//! about the resource it targeted.

use thiserror::Error;

use storerate_core::Role;

use super::token::Claims;

/// The protected operations of the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create a user account with an explicit role.
    AddUser,
    /// Register a new store.
    AddStore,
    /// Read platform-wide totals.
    DashboardCounts,
    /// List and filter user accounts.
    ListUsers,
    /// List and filter stores with their averages.
    ListStores,
    /// Read one user's detail, including an owner's store average.
    GetUserDetail,
    /// Browse the store catalog with the caller's own ratings overlaid.
    BrowseStores,
    /// Search the store catalog by name or address.
    SearchStores,
    /// Submit or overwrite a rating.
    SubmitRating,
    /// Change the caller's own password.
    UpdatePassword,
    /// Read the dashboard for the caller's own store.
    OwnerDashboard,
}

/// The caller's role does not grant the requested operation.
///
/// Deliberately uniform: the message never names the operation or the role,
/// so a probing client learns nothing from the refusal.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("access denied")]
pub struct AccessDenied;

/// Whether `role` is granted `operation`.
#[must_use]
pub const fn is_allowed(role: Role, operation: Operation) -> bool {
    match role {
        Role::Admin => matches!(
            operation,
            Operation::AddUser
                | Operation::AddStore
                | Operation::DashboardCounts
                | Operation::ListUsers
                | Operation::ListStores
                | Operation::GetUserDetail
        ),
        Role::User => matches!(
            operation,
            Operation::BrowseStores
                | Operation::SearchStores
                | Operation::SubmitRating
                | Operation::UpdatePassword
        ),
        Role::StoreOwner => matches!(
            operation,
            Operation::OwnerDashboard | Operation::UpdatePassword
        ),
    }
}

/// Authorize `claims` for `operation`.
///
/// # Errors
///
/// Returns [`AccessDenied`] when the caller's role does not grant the
/// operation.
pub const fn authorize(claims: &Claims, operation: Operation) -> Result<(), AccessDenied> {
    if is_allowed(claims.role, operation) {
        Ok(())
    } else {
        Err(AccessDenied)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ALL_OPERATIONS: [Operation; 11] = [
        Operation::AddUser,
        Operation::AddStore,
        Operation::DashboardCounts,
        Operation::ListUsers,
        Operation::ListStores,
        Operation::GetUserDetail,
        Operation::BrowseStores,
        Operation::SearchStores,
        Operation::SubmitRating,
        Operation::UpdatePassword,
        Operation::OwnerDashboard,
    ];

    fn allowed_for(role: Role) -> Vec<Operation> {
        ALL_OPERATIONS
            .into_iter()
            .filter(|&op| is_allowed(role, op))
            .collect()
    }

    #[test]
    fn test_admin_capabilities() {
        assert_eq!(
            allowed_for(Role::Admin),
            vec![
                Operation::AddUser,
                Operation::AddStore,
                Operation::DashboardCounts,
                Operation::ListUsers,
                Operation::ListStores,
                Operation::GetUserDetail,
            ]
        );
    }

    #[test]
    fn test_user_capabilities() {
        assert_eq!(
            allowed_for(Role::User),
            vec![
                Operation::BrowseStores,
                Operation::SearchStores,
                Operation::SubmitRating,
                Operation::UpdatePassword,
            ]
        );
    }

    #[test]
    fn test_store_owner_capabilities() {
        assert_eq!(
            allowed_for(Role::StoreOwner),
            vec![Operation::UpdatePassword, Operation::OwnerDashboard]
        );
    }

    #[test]
    fn test_admin_cannot_rate() {
        assert!(!is_allowed(Role::Admin, Operation::SubmitRating));
    }

    #[test]
    fn test_user_cannot_reach_admin_surface() {
        assert!(!is_allowed(Role::User, Operation::AddUser));
        assert!(!is_allowed(Role::User, Operation::DashboardCounts));
    }

    #[test]
    fn test_owner_cannot_browse_as_user() {
        assert!(!is_allowed(Role::StoreOwner, Operation::BrowseStores));
        assert!(!is_allowed(Role::StoreOwner, Operation::SubmitRating));
    }
}
