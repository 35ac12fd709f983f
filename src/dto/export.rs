//! Flat CSV rows for each exportable resource.

use serde::Serialize;

use crate::domain::activity::Activity;
use crate::domain::customer::Customer;
use crate::domain::invoice::Invoice;
use crate::domain::job::Job;
use crate::domain::payment::Payment;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
pub struct CustomerRow {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub archived: bool,
    pub created_at: String,
}

impl CustomerRow {
    pub const HEADERS: &'static [&'static str] =
        &["id", "name", "email", "phone", "address", "archived", "created_at"];
}

impl From<&Customer> for CustomerRow {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.get(),
            name: customer.name.to_string(),
            email: customer
                .email
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            phone: customer
                .phone
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            address: customer.address.clone().unwrap_or_default(),
            archived: customer.archived,
            created_at: customer.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobRow {
    pub id: i32,
    pub customer_id: i32,
    pub title: String,
    pub status: &'static str,
    pub archived: bool,
    pub created_at: String,
}

impl JobRow {
    pub const HEADERS: &'static [&'static str] =
        &["id", "customer_id", "title", "status", "archived", "created_at"];
}

impl From<&Job> for JobRow {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.get(),
            customer_id: job.customer_id.get(),
            title: job.title.to_string(),
            status: job.status.as_str(),
            archived: job.archived,
            created_at: job.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceRow {
    pub id: i32,
    pub number: String,
    pub customer_id: i32,
    pub status: &'static str,
    pub amount: String,
    pub due_date: String,
    pub archived: bool,
    pub created_at: String,
}

impl InvoiceRow {
    pub const HEADERS: &'static [&'static str] = &[
        "id",
        "number",
        "customer_id",
        "status",
        "amount",
        "due_date",
        "archived",
        "created_at",
    ];
}

impl From<&Invoice> for InvoiceRow {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id.get(),
            number: invoice.number.to_string(),
            customer_id: invoice.customer_id.get(),
            status: invoice.status.as_str(),
            amount: invoice.amount.to_string(),
            due_date: invoice
                .due_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            archived: invoice.archived,
            created_at: invoice.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentRow {
    pub id: i32,
    pub invoice_id: i32,
    pub amount: String,
    pub method: &'static str,
    pub status: &'static str,
    pub created_at: String,
}

impl PaymentRow {
    pub const HEADERS: &'static [&'static str] =
        &["id", "invoice_id", "amount", "method", "status", "created_at"];
}

impl From<&Payment> for PaymentRow {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id.get(),
            invoice_id: payment.invoice_id.get(),
            amount: payment.amount.to_string(),
            method: payment.method.as_str(),
            status: payment.status.as_str(),
            created_at: payment.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityRow {
    pub id: i32,
    pub subject_type: &'static str,
    pub subject_id: i32,
    pub action: &'static str,
    pub description: String,
    pub created_at: String,
}

impl ActivityRow {
    pub const HEADERS: &'static [&'static str] = &[
        "id",
        "subject_type",
        "subject_id",
        "action",
        "description",
        "created_at",
    ];
}

impl From<&Activity> for ActivityRow {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id.get(),
            subject_type: activity.subject_type.as_str(),
            subject_id: activity.subject_id,
            action: activity.action.as_str(),
            description: activity.description.clone(),
            created_at: activity.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}
