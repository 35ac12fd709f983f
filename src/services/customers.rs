use crate::domain::auth::AuthenticatedUser;
use crate::domain::customer::{Customer, CustomerListQuery};
use crate::forms::list::parse_list_query;
use crate::pagination::Page;
use crate::repository::CustomerReader;
use crate::services::{ServiceResult, authorize, into_page};

/// Returns one page of the caller's customers for the raw query string.
pub fn list_customers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    raw_query: &str,
) -> ServiceResult<Page<Customer>>
where
    R: CustomerReader + ?Sized,
{
    let owner = authorize(user)?;
    let query: CustomerListQuery = parse_list_query(raw_query)?;

    let listing = repo.list_customers(owner, &query).map_err(|err| {
        log::error!("Failed to list customers: {err}");
        err
    })?;

    Ok(into_page(listing, &query))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::Utc;

    use super::*;
    use crate::domain::listing::SortOrder;
    use crate::domain::types::{CustomerId, CustomerName, UserId};
    use crate::forms::QueryError;
    use crate::repository::Listing;
    use crate::repository::errors::{RepositoryError, RepositoryResult};
    use crate::services::ServiceError;
    use crate::services::test_support::{billing_user, outsider};

    #[derive(Default)]
    struct FakeRepo {
        seen: RefCell<Vec<(UserId, CustomerListQuery)>>,
        fail: bool,
    }

    fn customer(id: i32) -> Customer {
        let now = Utc::now().naive_utc();
        Customer {
            id: CustomerId::new(id).unwrap(),
            user_id: UserId::new(1).unwrap(),
            name: CustomerName::new(format!("Customer {id}")).unwrap(),
            email: None,
            phone: None,
            address: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    impl CustomerReader for FakeRepo {
        fn get_customer_by_id(
            &self,
            id: CustomerId,
            _owner: UserId,
        ) -> RepositoryResult<Option<Customer>> {
            Ok(Some(customer(id.get())))
        }

        fn list_customers(
            &self,
            owner: UserId,
            query: &CustomerListQuery,
        ) -> RepositoryResult<Listing<Customer>> {
            if self.fail {
                return Err(RepositoryError::ConnectionError("down".into()));
            }
            self.seen.borrow_mut().push((owner, query.clone()));
            Ok((7, (1..=5).map(customer).collect()))
        }
    }

    #[test]
    fn returns_page_envelope_for_query() {
        let repo = FakeRepo::default();

        let page = list_customers(
            &repo,
            &billing_user(),
            "page=1&perPage=5&sortBy=created_at&sortOrder=desc",
        )
        .unwrap();

        assert_eq!(page.data.len(), 5);
        assert_eq!(page.meta.total, 7);
        assert_eq!(page.meta.total_pages, 2);
        assert_eq!(page.meta.current_page, 1);

        let seen = repo.seen.borrow();
        assert_eq!(seen[0].0.get(), 1);
        assert_eq!(seen[0].1.sort.order, SortOrder::Desc);
    }

    #[test]
    fn invalid_query_never_reaches_repository() {
        let repo = FakeRepo::default();

        let result = list_customers(&repo, &billing_user(), "sortOrder=sideways");

        assert!(matches!(
            result,
            Err(ServiceError::Query(QueryError::Invalid(_)))
        ));
        assert!(repo.seen.borrow().is_empty());
    }

    #[test]
    fn requires_billing_role() {
        let repo = FakeRepo::default();

        let result = list_customers(&repo, &outsider(), "");

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
        assert!(repo.seen.borrow().is_empty());
    }

    #[test]
    fn repository_failures_propagate() {
        let repo = FakeRepo {
            fail: true,
            ..Default::default()
        };

        let result = list_customers(&repo, &billing_user(), "");

        assert!(matches!(
            result,
            Err(ServiceError::Repository(RepositoryError::ConnectionError(_)))
        ));
    }
}
