use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::invoice::{Invoice as DomainInvoice, NewInvoice as DomainNewInvoice};
use crate::domain::types::{
    CustomerId, InvoiceId, InvoiceNumber, JobId, Money, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct Invoice {
    pub id: i32,
    pub user_id: i32,
    pub customer_id: i32,
    pub job_id: Option<i32>,
    pub number: String,
    pub status: String,
    pub amount_cents: i64,
    pub due_date: Option<NaiveDate>,
    pub archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct NewInvoice<'a> {
    pub user_id: i32,
    pub customer_id: i32,
    pub job_id: Option<i32>,
    pub number: &'a str,
    pub status: &'a str,
    pub amount_cents: i64,
    pub due_date: Option<NaiveDate>,
    pub archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Invoice> for DomainInvoice {
    type Error = TypeConstraintError;

    fn try_from(invoice: Invoice) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InvoiceId::new(invoice.id)?,
            user_id: UserId::new(invoice.user_id)?,
            customer_id: CustomerId::new(invoice.customer_id)?,
            job_id: invoice.job_id.map(JobId::new).transpose()?,
            number: InvoiceNumber::new(invoice.number)?,
            status: invoice.status.parse()?,
            amount: Money::from_cents(invoice.amount_cents)?,
            due_date: invoice.due_date,
            archived: invoice.archived,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewInvoice> for NewInvoice<'a> {
    fn from(invoice: &'a DomainNewInvoice) -> Self {
        Self {
            user_id: invoice.user_id.get(),
            customer_id: invoice.customer_id.get(),
            job_id: invoice.job_id.map(JobId::get),
            number: invoice.number.as_str(),
            status: invoice.status.as_str(),
            amount_cents: invoice.amount.cents(),
            due_date: invoice.due_date,
            archived: invoice.archived,
            created_at: invoice.created_at,
            updated_at: invoice.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invoice::InvoiceStatus;
    use chrono::Utc;

    #[test]
    fn unknown_status_is_rejected() {
        let now = Utc::now().naive_utc();
        let db = Invoice {
            id: 1,
            user_id: 1,
            customer_id: 1,
            job_id: None,
            number: "INV-1".to_string(),
            status: "lost".to_string(),
            amount_cents: 100,
            due_date: None,
            archived: false,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(
            DomainInvoice::try_from(db.clone()),
            Err(TypeConstraintError::InvalidValue("lost".to_string()))
        );

        let domain = DomainInvoice::try_from(Invoice {
            status: "overdue".to_string(),
            ..db
        })
        .unwrap();
        assert_eq!(domain.status, InvoiceStatus::Overdue);
        assert_eq!(domain.amount.cents(), 100);
    }
}
