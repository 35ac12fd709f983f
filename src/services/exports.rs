//! CSV exports of the resource lists.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::activity::{ActivityAction, ActivityListQuery, SubjectType};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::customer::CustomerListQuery;
use crate::domain::invoice::InvoiceListQuery;
use crate::domain::job::JobListQuery;
use crate::domain::payment::PaymentListQuery;
use crate::domain::types::str_enum;
use crate::dto::export::{ActivityRow, CustomerRow, InvoiceRow, JobRow, PaymentRow};
use crate::exports::{BlobStore, ExportError, write_csv};
use crate::forms::list::parse_list_query;
use crate::repository::{
    ActivityReader, ActivityWriter, CustomerReader, InvoiceReader, JobReader, PaymentReader,
};
use crate::services::activities::record_activity;
use crate::services::{ServiceError, ServiceResult, authorize};

str_enum!(
    /// Resource lists that can be exported.
    ExportResource {
        Customers => "customers",
        Jobs => "jobs",
        Invoices => "invoices",
        Payments => "payments",
        Activities => "activities",
    }
);

impl ExportResource {
    /// Subject recorded in the activity log; exporting the log itself is not logged.
    pub const fn subject_type(self) -> Option<SubjectType> {
        match self {
            ExportResource::Customers => Some(SubjectType::Customer),
            ExportResource::Jobs => Some(SubjectType::Job),
            ExportResource::Invoices => Some(SubjectType::Invoice),
            ExportResource::Payments => Some(SubjectType::Payment),
            ExportResource::Activities => None,
        }
    }
}

/// A stored export.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub resource: ExportResource,
    /// Key the file was stored under.
    pub key: String,
    pub file_name: String,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

fn rows_to_csv<'a, T, Row>(items: &'a [T], headers: &[&str]) -> Result<(usize, Vec<u8>), ExportError>
where
    Row: Serialize + From<&'a T>,
{
    let rows: Vec<Row> = items.iter().map(Row::from).collect();
    Ok((rows.len(), write_csv(&rows, headers)?))
}

/// Serializes every row matching the query of `resource` (pagination is
/// ignored), stores the file and records an `exported` activity.
///
/// An unknown resource name is reported as [`ServiceError::NotFound`].
pub fn export_resource<R, B>(
    repo: &R,
    store: &B,
    user: &AuthenticatedUser,
    resource: &str,
    raw_query: &str,
) -> ServiceResult<ExportFile>
where
    R: CustomerReader
        + JobReader
        + InvoiceReader
        + PaymentReader
        + ActivityReader
        + ActivityWriter
        + ?Sized,
    B: BlobStore + ?Sized,
{
    let owner = authorize(user)?;
    let resource: ExportResource = resource.parse().map_err(|_| ServiceError::NotFound)?;

    let (rows, bytes) = match resource {
        ExportResource::Customers => {
            let query = parse_list_query::<_, _>(raw_query)
                .map(CustomerListQuery::without_pagination)?;
            let (_, items) = repo.list_customers(owner, &query)?;
            rows_to_csv::<_, CustomerRow>(&items, CustomerRow::HEADERS)?
        }
        ExportResource::Jobs => {
            let query = parse_list_query::<_, _>(raw_query).map(JobListQuery::without_pagination)?;
            let (_, items) = repo.list_jobs(owner, &query)?;
            rows_to_csv::<_, JobRow>(&items, JobRow::HEADERS)?
        }
        ExportResource::Invoices => {
            let query = parse_list_query::<_, _>(raw_query)
                .map(InvoiceListQuery::without_pagination)?;
            let (_, items) = repo.list_invoices(owner, &query)?;
            rows_to_csv::<_, InvoiceRow>(&items, InvoiceRow::HEADERS)?
        }
        ExportResource::Payments => {
            let query = parse_list_query::<_, _>(raw_query)
                .map(PaymentListQuery::without_pagination)?;
            let (_, items) = repo.list_payments(owner, &query)?;
            rows_to_csv::<_, PaymentRow>(&items, PaymentRow::HEADERS)?
        }
        ExportResource::Activities => {
            let query = parse_list_query::<_, _>(raw_query)
                .map(ActivityListQuery::without_pagination)?;
            let (_, items) = repo.list_activities(owner, &query)?;
            rows_to_csv::<_, ActivityRow>(&items, ActivityRow::HEADERS)?
        }
    };

    let file_name = format!("{resource}-{}.csv", Uuid::new_v4());
    let key = format!("{owner}/{file_name}");
    store.put(&key, &bytes).map_err(|err| {
        log::error!("Failed to store {resource} export: {err}");
        err
    })?;

    if let Some(subject_type) = resource.subject_type() {
        if let Err(err) = record_activity(
            repo,
            owner,
            subject_type,
            0,
            ActivityAction::Exported,
            &format!("Exported {rows} {resource} to {file_name}"),
        ) {
            // An export without its activity entry is not kept.
            if let Err(cleanup) = store.delete(&key) {
                log::error!("Failed to remove export {key} after logging failed: {cleanup}");
            }
            return Err(err);
        }
    }

    Ok(ExportFile {
        resource,
        key,
        file_name,
        rows,
        bytes,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::domain::activity::Activity;
    use crate::domain::customer::Customer;
    use crate::domain::types::{ActivityId, CustomerId, CustomerName, UserId};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::billing_user;

    #[derive(Default)]
    struct MemoryStore {
        files: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl BlobStore for MemoryStore {
        fn put(&self, key: &str, bytes: &[u8]) -> Result<String, ExportError> {
            self.files
                .lock()
                .unwrap()
                .push((key.to_string(), bytes.to_vec()));
            Ok(key.to_string())
        }

        fn delete(&self, key: &str) -> Result<(), ExportError> {
            self.files.lock().unwrap().retain(|(stored, _)| stored != key);
            Ok(())
        }
    }

    fn customer(id: i32, name: &str) -> Customer {
        let now = Utc::now().naive_utc();
        Customer {
            id: CustomerId::new(id).unwrap(),
            user_id: UserId::new(1).unwrap(),
            name: CustomerName::new(name).unwrap(),
            email: None,
            phone: None,
            address: Some("1 Main St".into()),
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn exports_every_matching_row_without_pagination() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers()
            .withf(|_, query| query.pagination.is_none() && query.search.as_deref() == Some("a"))
            .times(1)
            .returning(|_, _| {
                Ok((
                    12,
                    (1..=12).map(|id| customer(id, &format!("Name {id}"))).collect(),
                ))
            });
        repo.expect_create_activity()
            .withf(|activity| {
                activity.action == ActivityAction::Exported
                    && activity.subject_type == SubjectType::Customer
                    && activity.subject_id == 0
            })
            .times(1)
            .returning(|new| {
                Ok(Activity {
                    id: ActivityId::new(1).unwrap(),
                    user_id: new.user_id,
                    subject_type: new.subject_type,
                    subject_id: new.subject_id,
                    action: new.action,
                    description: new.description.clone(),
                    created_at: new.created_at,
                })
            });
        let store = MemoryStore::default();

        let file = export_resource(
            &repo,
            &store,
            &billing_user(),
            "customers",
            "page=2&perPage=5&search=a",
        )
        .unwrap();

        assert_eq!(file.rows, 12);
        let csv = String::from_utf8(file.bytes.clone()).unwrap();
        assert_eq!(csv.lines().count(), 13);
        assert!(csv.starts_with("id,name,email,phone,address,archived,created_at\n"));
        assert!(file.key.starts_with("1/customers-"));

        let files = store.files.lock().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].1, file.bytes);
    }

    #[test]
    fn failed_activity_log_removes_stored_file() {
        let mut repo = MockRepository::new();
        repo.expect_list_customers()
            .returning(|_, _| Ok((1, vec![customer(1, "Acme")])));
        repo.expect_create_activity()
            .times(1)
            .returning(|_| Err(RepositoryError::DatabaseError("disk I/O error".into())));
        let store = MemoryStore::default();

        let result = export_resource(&repo, &store, &billing_user(), "customers", "");

        assert!(matches!(result, Err(ServiceError::Repository(_))));
        assert!(store.files.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_resource_is_not_found() {
        let repo = MockRepository::new();
        let store = MemoryStore::default();

        let result = export_resource(&repo, &store, &billing_user(), "passwords", "");

        assert!(matches!(result, Err(ServiceError::NotFound)));
        assert!(store.files.lock().unwrap().is_empty());
    }

    #[test]
    fn activity_export_is_not_logged() {
        let mut repo = MockRepository::new();
        repo.expect_list_activities()
            .returning(|_, _| Ok((0, Vec::new())));
        repo.expect_create_activity().times(0);
        let store = MemoryStore::default();

        let file = export_resource(&repo, &store, &billing_user(), "activities", "").unwrap();

        assert_eq!(file.rows, 0);
        assert_eq!(
            String::from_utf8(file.bytes).unwrap(),
            "id,subject_type,subject_id,action,description,created_at\n"
        );
    }

    #[test]
    fn invalid_query_is_rejected_before_listing() {
        let mut repo = MockRepository::new();
        repo.expect_list_invoices().times(0);
        let store = MemoryStore::default();

        let result = export_resource(&repo, &store, &billing_user(), "invoices", "sortBy=secret");

        assert!(matches!(result, Err(ServiceError::Query(_))));
    }
}
