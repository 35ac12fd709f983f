//! Outbound invoice emails: a named template registry and the transports the
//! rendered messages are routed to.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use thiserror::Error;

use crate::domain::customer::Customer;
use crate::domain::invoice::Invoice;
use crate::domain::types::str_enum;
use crate::models::zmq::ZmqEmailMessage;

str_enum!(
    /// Templates known to the registry.
    EmailTemplate {
        InvoiceIssued => "invoice_issued",
        PaymentReminder => "payment_reminder",
    }
);

impl EmailTemplate {
    fn subject_name(self) -> String {
        format!("{}/subject.txt", self.as_str())
    }

    fn body_name(self) -> String {
        format!("{}/body.txt", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("template error: {0}")]
    Template(String),

    #[error("missing template: {0}")]
    MissingTemplate(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<tera::Error> for NotificationError {
    fn from(err: tera::Error) -> Self {
        NotificationError::Template(err.to_string())
    }
}

impl From<zmq::Error> for NotificationError {
    fn from(err: zmq::Error) -> Self {
        NotificationError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        NotificationError::Transport(err.to_string())
    }
}

/// A rendered email ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub template: EmailTemplate,
}

impl From<&EmailMessage> for ZmqEmailMessage {
    fn from(message: &EmailMessage) -> Self {
        Self {
            from: message.from.clone(),
            to: message.to.clone(),
            subject: message.subject.clone(),
            body: message.body.clone(),
            template: message.template.as_str().to_string(),
        }
    }
}

/// Delivers rendered messages.
pub trait Mailer: Send + Sync {
    fn send(&self, message: &EmailMessage) -> Result<(), NotificationError>;
}

/// Named subject/body template pairs rendered with Tera.
///
/// Each template `name` is stored as `name/subject.txt` and `name/body.txt`.
pub struct EmailRegistry {
    tera: Tera,
}

impl EmailRegistry {
    /// Registry with the templates bundled into the binary.
    pub fn with_default_templates() -> Result<Self, NotificationError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (
                "invoice_issued/subject.txt",
                include_str!("../templates/email/invoice_issued/subject.txt"),
            ),
            (
                "invoice_issued/body.txt",
                include_str!("../templates/email/invoice_issued/body.txt"),
            ),
            (
                "payment_reminder/subject.txt",
                include_str!("../templates/email/payment_reminder/subject.txt"),
            ),
            (
                "payment_reminder/body.txt",
                include_str!("../templates/email/payment_reminder/body.txt"),
            ),
        ])?;
        Self::from_tera(tera)
    }

    /// Registry loaded from a glob such as `templates/email/**/*`.
    pub fn from_glob(glob: &str) -> Result<Self, NotificationError> {
        let tera = Tera::new(glob)?;
        Self::from_tera(tera)
    }

    /// Wraps `tera`, checking that every known template is present.
    pub fn from_tera(tera: Tera) -> Result<Self, NotificationError> {
        let names: Vec<&str> = tera.get_template_names().collect();
        for template in [EmailTemplate::InvoiceIssued, EmailTemplate::PaymentReminder] {
            for name in [template.subject_name(), template.body_name()] {
                if !names.contains(&name.as_str()) {
                    return Err(NotificationError::MissingTemplate(name));
                }
            }
        }
        Ok(Self { tera })
    }

    /// Renders the subject (trimmed to one line) and body of `template`.
    pub fn render(
        &self,
        template: EmailTemplate,
        context: &Context,
    ) -> Result<(String, String), NotificationError> {
        let subject = self.tera.render(&template.subject_name(), context)?;
        let body = self.tera.render(&template.body_name(), context)?;
        Ok((subject.trim().to_string(), body))
    }
}

/// Template variables describing an invoice and its customer.
pub fn invoice_context(invoice: &Invoice, customer: &Customer, sender_name: &str) -> Context {
    let mut context = Context::new();
    context.insert("number", invoice.number.as_str());
    context.insert("amount", &invoice.amount.to_string());
    context.insert("status", invoice.status.as_str());
    context.insert(
        "due_date",
        &invoice.due_date.map(|date| date.format("%Y-%m-%d").to_string()),
    );
    context.insert("customer_name", customer.name.as_str());
    context.insert("sender_name", sender_name);
    context
}

/// Publishes messages as JSON on a ZeroMQ PUB socket read by the emailer service.
pub struct ZmqMailer {
    socket: Mutex<zmq::Socket>,
}

impl ZmqMailer {
    pub fn connect(endpoint: &str) -> Result<Self, NotificationError> {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::PUB)?;
        socket.connect(endpoint)?;
        log::info!("Email notifications are published to {endpoint}");
        Ok(Self {
            socket: Mutex::new(socket),
        })
    }
}

impl Mailer for ZmqMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        let payload = serde_json::to_vec(&ZmqEmailMessage::from(message))?;
        let socket = self
            .socket
            .lock()
            .map_err(|_| NotificationError::Transport("socket lock poisoned".to_string()))?;
        socket.send(payload, 0)?;
        Ok(())
    }
}

/// Keeps every message in memory; used where no transport is configured.
#[derive(Default)]
pub struct InMemoryMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl Mailer for InMemoryMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .map_err(|_| NotificationError::Transport("mailbox lock poisoned".to_string()))?
            .push(message.clone());
        Ok(())
    }
}
