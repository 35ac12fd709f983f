use crate::db::{DbConnection, DbPool};
use crate::domain::activity::{Activity, ActivityListQuery, NewActivity};
use crate::domain::customer::{Customer, CustomerListQuery, NewCustomer};
use crate::domain::invoice::{Invoice, InvoiceListQuery, InvoiceStatus, NewInvoice};
use crate::domain::job::{Job, JobListQuery, NewJob};
use crate::domain::payment::{NewPayment, Payment, PaymentListQuery};
use crate::domain::types::{CustomerId, InvoiceId, UserId};
use crate::repository::errors::RepositoryResult;

/// Orders a boxed query by `$column` and then by `$id` in the same direction,
/// so equal sort keys still produce a stable, reversible order.
macro_rules! order_by {
    ($query:expr, $column:expr, $id:expr, $order:expr) => {
        match $order {
            $crate::domain::listing::SortOrder::Asc => {
                $query.order_by($column.asc()).then_order_by($id.asc())
            }
            $crate::domain::listing::SortOrder::Desc => {
                $query.order_by($column.desc()).then_order_by($id.desc())
            }
        }
    };
}

/// Applies the optional offset window of a list query.
macro_rules! paginate {
    ($query:expr, $pagination:expr) => {
        match $pagination {
            Some(pagination) => {
                let (limit, offset) = pagination.limit_offset();
                $query.limit(limit).offset(offset)
            }
            None => $query,
        }
    };
}

pub mod activity;
pub mod customer;
pub mod errors;
pub mod invoice;
pub mod job;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod payment;

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Lists return the total number of matching rows alongside the requested page.
pub type Listing<T> = (usize, Vec<T>);

pub trait CustomerReader {
    fn get_customer_by_id(&self, id: CustomerId, owner: UserId)
    -> RepositoryResult<Option<Customer>>;
    fn list_customers(
        &self,
        owner: UserId,
        query: &CustomerListQuery,
    ) -> RepositoryResult<Listing<Customer>>;
}

pub trait CustomerWriter {
    fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
}

pub trait JobReader {
    fn list_jobs(&self, owner: UserId, query: &JobListQuery) -> RepositoryResult<Listing<Job>>;
}

pub trait JobWriter {
    fn create_job(&self, new_job: &NewJob) -> RepositoryResult<Job>;
}

pub trait InvoiceReader {
    fn get_invoice_by_id(&self, id: InvoiceId, owner: UserId) -> RepositoryResult<Option<Invoice>>;
    fn list_invoices(
        &self,
        owner: UserId,
        query: &InvoiceListQuery,
    ) -> RepositoryResult<Listing<Invoice>>;
}

pub trait InvoiceWriter {
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
    fn update_invoice_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> RepositoryResult<Invoice>;
}

pub trait PaymentReader {
    fn list_payments(
        &self,
        owner: UserId,
        query: &PaymentListQuery,
    ) -> RepositoryResult<Listing<Payment>>;
}

pub trait PaymentWriter {
    fn create_payment(&self, new_payment: &NewPayment) -> RepositoryResult<Payment>;
}

pub trait ActivityReader {
    fn list_activities(
        &self,
        owner: UserId,
        query: &ActivityListQuery,
    ) -> RepositoryResult<Listing<Activity>>;
}

pub trait ActivityWriter {
    fn create_activity(&self, new_activity: &NewActivity) -> RepositoryResult<Activity>;
}
