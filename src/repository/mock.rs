//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::activity::{Activity, ActivityListQuery, NewActivity};
use crate::domain::customer::{Customer, CustomerListQuery, NewCustomer};
use crate::domain::invoice::{Invoice, InvoiceListQuery, InvoiceStatus, NewInvoice};
use crate::domain::job::{Job, JobListQuery, NewJob};
use crate::domain::payment::{NewPayment, Payment, PaymentListQuery};
use crate::domain::types::{CustomerId, InvoiceId, UserId};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ActivityReader, ActivityWriter, CustomerReader, CustomerWriter, InvoiceReader, InvoiceWriter,
    JobReader, JobWriter, Listing, PaymentReader, PaymentWriter,
};

mock! {
    pub Repository {}

    impl CustomerReader for Repository {
        fn get_customer_by_id(
            &self,
            id: CustomerId,
            owner: UserId,
        ) -> RepositoryResult<Option<Customer>>;
        fn list_customers(
            &self,
            owner: UserId,
            query: &CustomerListQuery,
        ) -> RepositoryResult<Listing<Customer>>;
    }

    impl CustomerWriter for Repository {
        fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
    }

    impl JobReader for Repository {
        fn list_jobs(&self, owner: UserId, query: &JobListQuery) -> RepositoryResult<Listing<Job>>;
    }

    impl JobWriter for Repository {
        fn create_job(&self, new_job: &NewJob) -> RepositoryResult<Job>;
    }

    impl InvoiceReader for Repository {
        fn get_invoice_by_id(
            &self,
            id: InvoiceId,
            owner: UserId,
        ) -> RepositoryResult<Option<Invoice>>;
        fn list_invoices(
            &self,
            owner: UserId,
            query: &InvoiceListQuery,
        ) -> RepositoryResult<Listing<Invoice>>;
    }

    impl InvoiceWriter for Repository {
        fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
        fn update_invoice_status(
            &self,
            id: InvoiceId,
            status: InvoiceStatus,
        ) -> RepositoryResult<Invoice>;
    }

    impl PaymentReader for Repository {
        fn list_payments(
            &self,
            owner: UserId,
            query: &PaymentListQuery,
        ) -> RepositoryResult<Listing<Payment>>;
    }

    impl PaymentWriter for Repository {
        fn create_payment(&self, new_payment: &NewPayment) -> RepositoryResult<Payment>;
    }

    impl ActivityReader for Repository {
        fn list_activities(
            &self,
            owner: UserId,
            query: &ActivityListQuery,
        ) -> RepositoryResult<Listing<Activity>>;
    }

    impl ActivityWriter for Repository {
        fn create_activity(&self, new_activity: &NewActivity) -> RepositoryResult<Activity>;
    }
}
