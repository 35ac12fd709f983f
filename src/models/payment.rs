use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::payment::{NewPayment as DomainNewPayment, Payment as DomainPayment};
use crate::domain::types::{InvoiceId, Money, PaymentId, TypeConstraintError};
use crate::models::invoice::Invoice;

#[derive(Debug, Clone, Identifiable, Queryable, Associations)]
#[diesel(belongs_to(Invoice, foreign_key = invoice_id))]
#[diesel(table_name = crate::schema::payments)]
pub struct Payment {
    pub id: i32,
    pub invoice_id: i32,
    pub amount_cents: i64,
    pub method: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::payments)]
pub struct NewPayment<'a> {
    pub invoice_id: i32,
    pub amount_cents: i64,
    pub method: &'a str,
    pub status: &'a str,
    pub created_at: NaiveDateTime,
}

impl TryFrom<Payment> for DomainPayment {
    type Error = TypeConstraintError;

    fn try_from(payment: Payment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PaymentId::new(payment.id)?,
            invoice_id: InvoiceId::new(payment.invoice_id)?,
            amount: Money::from_cents(payment.amount_cents)?,
            method: payment.method.parse()?,
            status: payment.status.parse()?,
            created_at: payment.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewPayment> for NewPayment<'a> {
    fn from(payment: &'a DomainNewPayment) -> Self {
        Self {
            invoice_id: payment.invoice_id.get(),
            amount_cents: payment.amount.cents(),
            method: payment.method.as_str(),
            status: payment.status.as_str(),
            created_at: payment.created_at,
        }
    }
}
