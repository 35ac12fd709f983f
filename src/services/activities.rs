//! The per-owner audit trail: listing and recording activities.

use crate::domain::activity::{Activity, ActivityAction, ActivityListQuery, NewActivity, SubjectType};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::UserId;
use crate::forms::list::parse_list_query;
use crate::pagination::Page;
use crate::repository::{ActivityReader, ActivityWriter};
use crate::services::{ServiceResult, authorize, into_page};

/// Returns one page of the caller's activity log.
pub fn list_activities<R>(
    repo: &R,
    user: &AuthenticatedUser,
    raw_query: &str,
) -> ServiceResult<Page<Activity>>
where
    R: ActivityReader + ?Sized,
{
    let owner = authorize(user)?;
    let query: ActivityListQuery = parse_list_query(raw_query)?;

    let listing = repo.list_activities(owner, &query).map_err(|err| {
        log::error!("Failed to list activities: {err}");
        err
    })?;

    Ok(into_page(listing, &query))
}

/// Appends an entry to the owner's activity log.
///
/// `subject_id` is `0` when the action concerns a whole list.
pub fn record_activity<R>(
    repo: &R,
    owner: UserId,
    subject_type: SubjectType,
    subject_id: i32,
    action: ActivityAction,
    description: &str,
) -> ServiceResult<Activity>
where
    R: ActivityWriter + ?Sized,
{
    let new_activity = NewActivity::new(owner, subject_type, subject_id, action, description);

    let activity = repo.create_activity(&new_activity).map_err(|err| {
        log::error!("Failed to record {action} activity for {subject_type} {subject_id}: {err}");
        err
    })?;

    log::debug!("Recorded {action} activity for {subject_type} {subject_id}");
    Ok(activity)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::domain::activity::ActivitySortField;
    use crate::domain::listing::SortField;
    use crate::domain::types::ActivityId;
    use crate::repository::Listing;
    use crate::repository::errors::RepositoryResult;
    use crate::services::test_support::billing_user;

    #[derive(Default)]
    struct FakeRepo {
        stored: RefCell<Vec<Activity>>,
    }

    impl ActivityReader for FakeRepo {
        fn list_activities(
            &self,
            _owner: UserId,
            query: &ActivityListQuery,
        ) -> RepositoryResult<Listing<Activity>> {
            let stored = self.stored.borrow();
            let matching: Vec<Activity> = stored
                .iter()
                .filter(|a| {
                    query
                        .filter
                        .subject_type
                        .is_none_or(|subject| a.subject_type == subject)
                })
                .cloned()
                .collect();
            Ok((matching.len(), matching))
        }
    }

    impl ActivityWriter for FakeRepo {
        fn create_activity(&self, new_activity: &NewActivity) -> RepositoryResult<Activity> {
            let mut stored = self.stored.borrow_mut();
            let activity = Activity {
                id: ActivityId::new(stored.len() as i32 + 1).unwrap(),
                user_id: new_activity.user_id,
                subject_type: new_activity.subject_type,
                subject_id: new_activity.subject_id,
                action: new_activity.action,
                description: new_activity.description.clone(),
                created_at: new_activity.created_at,
            };
            stored.push(activity.clone());
            Ok(activity)
        }
    }

    #[test]
    fn record_sanitizes_and_stores() {
        let repo = FakeRepo::default();

        let activity = record_activity(
            &repo,
            UserId::new(1).unwrap(),
            SubjectType::Invoice,
            9,
            ActivityAction::EmailSent,
            "<b>Invoice</b> sent<script>x()</script>",
        )
        .unwrap();

        assert_eq!(activity.description, "<b>Invoice</b> sent");
        assert_eq!(repo.stored.borrow().len(), 1);
    }

    #[test]
    fn list_filters_by_subject_type() {
        let repo = FakeRepo::default();
        let owner = UserId::new(1).unwrap();
        record_activity(&repo, owner, SubjectType::Customer, 0, ActivityAction::Exported, "a")
            .unwrap();
        record_activity(&repo, owner, SubjectType::Invoice, 3, ActivityAction::EmailSent, "b")
            .unwrap();

        let page = list_activities(&repo, &billing_user(), "subjectType=invoice").unwrap();

        assert_eq!(page.meta.total, 1);
        assert_eq!(page.data[0].subject_type, SubjectType::Invoice);
    }

    #[test]
    fn sort_by_is_checked_against_allow_list() {
        let repo = FakeRepo::default();

        let err = list_activities(&repo, &billing_user(), "sortBy=description").unwrap_err();

        assert!(err.to_string().contains("sortBy"));
        assert_eq!(
            ActivitySortField::default_field(),
            ActivitySortField::CreatedAt
        );
    }
}
