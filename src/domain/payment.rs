use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::listing::{ListQuery, sort_field};
use crate::domain::types::{InvoiceId, Money, PaymentId, str_enum};

str_enum!(
    /// Settlement state of a payment.
    PaymentStatus {
        Paid => "paid",
        Pending => "pending",
        Failed => "failed",
        Refunded => "refunded",
    }
);

str_enum!(
    /// How the customer paid.
    PaymentMethod {
        Cash => "cash",
        Card => "card",
        BankTransfer => "bank_transfer",
        Check => "check",
        Other => "other",
    }
);

/// A payment recorded against an invoice. Ownership follows the invoice.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewPayment {
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub created_at: NaiveDateTime,
}

impl NewPayment {
    #[must_use]
    pub fn new(invoice_id: InvoiceId, amount: Money, method: PaymentMethod) -> Self {
        Self {
            invoice_id,
            amount,
            method,
            status: PaymentStatus::Pending,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[must_use]
    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = created_at;
        self
    }
}

sort_field!(
    /// Columns payments may be ordered by.
    PaymentSortField {
        default: CreatedAt,
        CreatedAt => "created_at",
        Amount => "amount",
        Status => "status",
        Method => "method",
    }
);

/// Equality filters accepted by the payments listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub invoice_id: Option<InvoiceId>,
}

pub type PaymentListQuery = ListQuery<PaymentSortField, PaymentFilter>;
