//! JSON bodies returned by the `/api/v1` endpoints besides the page envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::invoice::InvoiceStatus;
use crate::domain::types::InvoiceId;
use crate::notifications::EmailTemplate;

/// Error body. `errors` is only present for validation failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_errors(mut self, errors: BTreeMap<String, Vec<String>>) -> Self {
        self.errors = errors;
        self
    }
}

/// Outcome of an invoice notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReceipt {
    pub invoice_id: InvoiceId,
    pub template: EmailTemplate,
    pub recipient: String,
    pub status: InvoiceStatus,
}
