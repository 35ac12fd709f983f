//! Business workflows behind the HTTP routes.
//!
//! Services take the raw query string and the authenticated caller, validate
//! everything up front and only then reach the repository.

use thiserror::Error;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::{AuthenticatedUser, check_role};
use crate::domain::listing::ListQuery;
use crate::domain::types::UserId;
use crate::exports::ExportError;
use crate::forms::QueryError;
use crate::notifications::NotificationError;
use crate::pagination::Page;
use crate::repository::Listing;
use crate::repository::errors::RepositoryError;

pub mod activities;
pub mod customers;
pub mod exports;
pub mod invoices;
pub mod jobs;
pub mod payments;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller's identity could not be established.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The caller lacks the role required by the service.
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("type constraint violation: {0}")]
    TypeConstraint(String),

    /// The record is not in a state that allows the action.
    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Notification(#[from] NotificationError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Checks the access role and resolves the owner scope of the caller.
pub(crate) fn authorize(user: &AuthenticatedUser) -> ServiceResult<UserId> {
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    user.owner_id().map_err(|err| {
        log::warn!("Rejected token subject {:?}: {err}", user.sub);
        ServiceError::Unauthenticated
    })
}

/// Wraps a repository listing into the page envelope of `query`.
pub(crate) fn into_page<T, S, F>(listing: Listing<T>, query: &ListQuery<S, F>) -> Page<T> {
    let (total, rows) = listing;
    let pagination = query.pagination.unwrap_or_default();
    Page::new(rows, total, pagination.per_page, pagination.page)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::SERVICE_ACCESS_ROLE;
    use crate::domain::auth::AuthenticatedUser;

    /// A caller holding the billing role, owning records of user `1`.
    pub fn billing_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".to_string(),
            email: "owner@example.com".to_string(),
            name: "Owner".to_string(),
            roles: vec![SERVICE_ACCESS_ROLE.to_string()],
            exp: 0,
        }
    }

    /// A caller without the billing role.
    pub fn outsider() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "2".to_string(),
            email: "outsider@example.com".to_string(),
            name: "Outsider".to_string(),
            roles: vec!["crm".to_string()],
            exp: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::domain::customer::CustomerListQuery;

    #[test]
    fn authorize_requires_role() {
        assert!(matches!(
            authorize(&outsider()),
            Err(ServiceError::Unauthorized)
        ));
        assert_eq!(authorize(&billing_user()).unwrap().get(), 1);
    }

    #[test]
    fn authorize_rejects_non_numeric_subject() {
        let mut user = billing_user();
        user.sub = "someone".to_string();
        assert!(matches!(
            authorize(&user),
            Err(ServiceError::Unauthenticated)
        ));
    }

    #[test]
    fn into_page_uses_query_window() {
        let query = CustomerListQuery::new().paginate(2, 5);
        let page = into_page((7, vec![1, 2]), &query);

        assert_eq!(page.meta.total, 7);
        assert_eq!(page.meta.per_page, 5);
        assert_eq!(page.meta.current_page, 2);
        assert_eq!(page.meta.total_pages, 2);
    }
}
