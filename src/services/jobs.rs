use crate::domain::auth::AuthenticatedUser;
use crate::domain::job::{Job, JobListQuery};
use crate::forms::list::parse_list_query;
use crate::pagination::Page;
use crate::repository::JobReader;
use crate::services::{ServiceResult, authorize, into_page};

/// Returns one page of the caller's jobs, optionally filtered by status or customer.
pub fn list_jobs<R>(repo: &R, user: &AuthenticatedUser, raw_query: &str) -> ServiceResult<Page<Job>>
where
    R: JobReader + ?Sized,
{
    let owner = authorize(user)?;
    let query: JobListQuery = parse_list_query(raw_query)?;

    let listing = repo.list_jobs(owner, &query).map_err(|err| {
        log::error!("Failed to list jobs: {err}");
        err
    })?;

    Ok(into_page(listing, &query))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::job::{JobSortField, JobStatus};
    use crate::domain::listing::SortOrder;
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;
    use crate::services::test_support::billing_user;

    #[test]
    fn forwards_status_and_customer_filters() {
        let mut repo = MockRepository::new();
        repo.expect_list_jobs()
            .withf(|owner, query| {
                owner.get() == 1
                    && query.filter.status == Some(JobStatus::InProgress)
                    && query.filter.customer_id.map(|id| id.get()) == Some(4)
                    && query.sort.field == JobSortField::Title
                    && query.sort.order == SortOrder::Asc
            })
            .times(1)
            .returning(|_, _| Ok((0, Vec::new())));

        let page = list_jobs(
            &repo,
            &billing_user(),
            "status=in_progress&customerId=4&sortBy=title&sortOrder=asc",
        )
        .unwrap();

        assert!(page.data.is_empty());
        assert_eq!(page.meta.total_pages, 0);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_list_jobs().times(0);

        let result = list_jobs(&repo, &billing_user(), "status=lost");

        assert!(matches!(result, Err(ServiceError::Query(_))));
    }
}
