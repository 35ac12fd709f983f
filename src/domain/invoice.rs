use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::listing::{ListQuery, sort_field};
use crate::domain::types::{CustomerId, InvoiceId, InvoiceNumber, JobId, Money, UserId, str_enum};

str_enum!(
    /// Lifecycle state of an invoice.
    InvoiceStatus {
        Draft => "draft",
        Sent => "sent",
        Paid => "paid",
        Overdue => "overdue",
        Void => "void",
    }
);

impl InvoiceStatus {
    /// Whether the customer still owes money on the invoice.
    pub const fn awaits_payment(self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::Overdue)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub user_id: UserId,
    pub customer_id: CustomerId,
    pub job_id: Option<JobId>,
    pub number: InvoiceNumber,
    pub status: InvoiceStatus,
    pub amount: Money,
    pub due_date: Option<NaiveDate>,
    pub archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewInvoice {
    pub user_id: UserId,
    pub customer_id: CustomerId,
    pub job_id: Option<JobId>,
    pub number: InvoiceNumber,
    pub status: InvoiceStatus,
    pub amount: Money,
    pub due_date: Option<NaiveDate>,
    pub archived: bool,
    pub created_at: NaiveDateTime,
}

impl NewInvoice {
    #[must_use]
    pub fn new(
        user_id: UserId,
        customer_id: CustomerId,
        number: InvoiceNumber,
        amount: Money,
    ) -> Self {
        Self {
            user_id,
            customer_id,
            job_id: None,
            number,
            status: InvoiceStatus::Draft,
            amount,
            due_date: None,
            archived: false,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[must_use]
    pub fn job(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }

    #[must_use]
    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}

sort_field!(
    /// Columns invoices may be ordered by.
    InvoiceSortField {
        default: CreatedAt,
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
        Number => "number",
        Status => "status",
        Amount => "amount",
        DueDate => "due_date",
    }
);

/// Equality filters accepted by the invoices listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<CustomerId>,
}

pub type InvoiceListQuery = ListQuery<InvoiceSortField, InvoiceFilter>;
