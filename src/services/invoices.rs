//! Invoice listing and the email notifications sent for an invoice.

use crate::domain::activity::{ActivityAction, SubjectType};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::customer::Customer;
use crate::domain::invoice::{Invoice, InvoiceListQuery, InvoiceStatus};
use crate::domain::types::{InvoiceId, UserId};
use crate::dto::api::NotificationReceipt;
use crate::forms::list::parse_list_query;
use crate::notifications::{EmailMessage, EmailRegistry, EmailTemplate, Mailer, invoice_context};
use crate::pagination::Page;
use crate::repository::{ActivityWriter, CustomerReader, InvoiceReader, InvoiceWriter};
use crate::services::activities::record_activity;
use crate::services::{ServiceError, ServiceResult, authorize, into_page};

/// Template registry, transport and sender address used for invoice emails.
pub struct EmailDispatch<'a> {
    pub registry: &'a EmailRegistry,
    pub mailer: &'a dyn Mailer,
    pub from: &'a str,
}

/// Returns one page of the caller's invoices.
pub fn list_invoices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    raw_query: &str,
) -> ServiceResult<Page<Invoice>>
where
    R: InvoiceReader + ?Sized,
{
    let owner = authorize(user)?;
    let query: InvoiceListQuery = parse_list_query(raw_query)?;

    let listing = repo.list_invoices(owner, &query).map_err(|err| {
        log::error!("Failed to list invoices: {err}");
        err
    })?;

    Ok(into_page(listing, &query))
}

/// Loads an owned invoice together with its customer.
fn load_invoice<R>(repo: &R, owner: UserId, invoice_id: i32) -> ServiceResult<(Invoice, Customer)>
where
    R: InvoiceReader + CustomerReader + ?Sized,
{
    let id = InvoiceId::new(invoice_id).map_err(|_| ServiceError::NotFound)?;

    let invoice = repo
        .get_invoice_by_id(id, owner)?
        .ok_or(ServiceError::NotFound)?;
    let customer = repo
        .get_customer_by_id(invoice.customer_id, owner)?
        .ok_or(ServiceError::NotFound)?;

    Ok((invoice, customer))
}

/// Renders `template` for the invoice and hands it to the transport.
fn deliver(
    dispatch: &EmailDispatch<'_>,
    template: EmailTemplate,
    invoice: &Invoice,
    customer: &Customer,
    sender_name: &str,
) -> ServiceResult<String> {
    let to = customer
        .email
        .as_ref()
        .ok_or_else(|| ServiceError::Precondition("customer has no email address".to_string()))?
        .to_string();

    let context = invoice_context(invoice, customer, sender_name);
    let (subject, body) = dispatch.registry.render(template, &context).map_err(|err| {
        log::error!("Failed to render {template} for invoice {}: {err}", invoice.id);
        err
    })?;

    let message = EmailMessage {
        from: dispatch.from.to_string(),
        to: to.clone(),
        subject,
        body,
        template,
    };
    dispatch.mailer.send(&message).map_err(|err| {
        log::error!("Failed to send {template} for invoice {}: {err}", invoice.id);
        err
    })?;

    Ok(to)
}

/// Emails the invoice to its customer and marks a draft as sent.
pub fn send_invoice<R>(
    repo: &R,
    dispatch: &EmailDispatch<'_>,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<NotificationReceipt>
where
    R: InvoiceReader + InvoiceWriter + CustomerReader + ActivityWriter + ?Sized,
{
    let owner = authorize(user)?;
    let (invoice, customer) = load_invoice(repo, owner, invoice_id)?;

    if invoice.status == InvoiceStatus::Void {
        return Err(ServiceError::Precondition(
            "void invoices cannot be sent".to_string(),
        ));
    }

    let template = EmailTemplate::InvoiceIssued;
    let to = deliver(dispatch, template, &invoice, &customer, &user.name)?;

    let status = if invoice.status == InvoiceStatus::Draft {
        repo.update_invoice_status(invoice.id, InvoiceStatus::Sent)
            .map_err(|err| {
                log::error!("Failed to mark invoice {} as sent: {err}", invoice.id);
                err
            })?
            .status
    } else {
        invoice.status
    };

    record_activity(
        repo,
        owner,
        SubjectType::Invoice,
        invoice.id.get(),
        ActivityAction::EmailSent,
        &format!("Invoice {} sent to {to}", invoice.number),
    )?;

    Ok(NotificationReceipt {
        invoice_id: invoice.id,
        template,
        recipient: to,
        status,
    })
}

/// Emails a payment reminder for an invoice that still awaits payment.
pub fn remind_invoice<R>(
    repo: &R,
    dispatch: &EmailDispatch<'_>,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<NotificationReceipt>
where
    R: InvoiceReader + CustomerReader + ActivityWriter + ?Sized,
{
    let owner = authorize(user)?;
    let (invoice, customer) = load_invoice(repo, owner, invoice_id)?;

    if !invoice.status.awaits_payment() {
        return Err(ServiceError::Precondition(format!(
            "reminders are only sent for sent or overdue invoices, this one is {}",
            invoice.status
        )));
    }

    let template = EmailTemplate::PaymentReminder;
    let to = deliver(dispatch, template, &invoice, &customer, &user.name)?;

    record_activity(
        repo,
        owner,
        SubjectType::Invoice,
        invoice.id.get(),
        ActivityAction::EmailSent,
        &format!("Payment reminder for invoice {} sent to {to}", invoice.number),
    )?;

    Ok(NotificationReceipt {
        invoice_id: invoice.id,
        template,
        recipient: to,
        status: invoice.status,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::activity::Activity;
    use crate::domain::types::{
        ActivityId, CustomerEmail, CustomerId, CustomerName, InvoiceNumber, Money,
    };
    use crate::notifications::InMemoryMailer;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{billing_user, outsider};

    fn invoice(status: InvoiceStatus) -> Invoice {
        let now = Utc::now().naive_utc();
        Invoice {
            id: InvoiceId::new(5).unwrap(),
            user_id: UserId::new(1).unwrap(),
            customer_id: CustomerId::new(3).unwrap(),
            job_id: None,
            number: InvoiceNumber::new("INV-5").unwrap(),
            status,
            amount: Money::from_cents(9_900).unwrap(),
            due_date: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn customer(email: Option<&str>) -> Customer {
        let now = Utc::now().naive_utc();
        Customer {
            id: CustomerId::new(3).unwrap(),
            user_id: UserId::new(1).unwrap(),
            name: CustomerName::new("Jane Roe").unwrap(),
            email: email.map(|e| CustomerEmail::new(e).unwrap()),
            phone: None,
            address: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn stored_activity() -> Activity {
        Activity {
            id: ActivityId::new(1).unwrap(),
            user_id: UserId::new(1).unwrap(),
            subject_type: SubjectType::Invoice,
            subject_id: 5,
            action: ActivityAction::EmailSent,
            description: String::new(),
            created_at: Utc::now().naive_utc(),
        }
    }

    fn repo_with(invoice_status: InvoiceStatus, email: Option<&'static str>) -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id()
            .returning(move |_, _| Ok(Some(invoice(invoice_status))));
        repo.expect_get_customer_by_id()
            .returning(move |_, _| Ok(Some(customer(email))));
        repo
    }

    #[test]
    fn send_marks_draft_as_sent_and_logs_activity() {
        let registry = EmailRegistry::with_default_templates().unwrap();
        let mailer = InMemoryMailer::new();
        let dispatch = EmailDispatch {
            registry: &registry,
            mailer: &mailer,
            from: "billing@example.com",
        };

        let mut repo = repo_with(InvoiceStatus::Draft, Some("jane@example.com"));
        repo.expect_update_invoice_status()
            .withf(|id, status| id.get() == 5 && *status == InvoiceStatus::Sent)
            .times(1)
            .returning(|_, status| Ok(invoice(status)));
        repo.expect_create_activity()
            .withf(|activity| {
                activity.action == ActivityAction::EmailSent
                    && activity.subject_id == 5
                    && activity.description == "Invoice INV-5 sent to jane@example.com"
            })
            .times(1)
            .returning(|_| Ok(stored_activity()));

        let receipt = send_invoice(&repo, &dispatch, &billing_user(), 5).unwrap();

        assert_eq!(receipt.status, InvoiceStatus::Sent);
        assert_eq!(receipt.recipient, "jane@example.com");
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template, EmailTemplate::InvoiceIssued);
        assert_eq!(sent[0].subject, "Invoice INV-5 from Owner");
    }

    #[test]
    fn send_rejects_void_invoice() {
        let registry = EmailRegistry::with_default_templates().unwrap();
        let mailer = InMemoryMailer::new();
        let dispatch = EmailDispatch {
            registry: &registry,
            mailer: &mailer,
            from: "billing@example.com",
        };

        let mut repo = repo_with(InvoiceStatus::Void, Some("jane@example.com"));
        repo.expect_update_invoice_status().times(0);
        repo.expect_create_activity().times(0);

        let result = send_invoice(&repo, &dispatch, &billing_user(), 5);

        assert!(matches!(result, Err(ServiceError::Precondition(_))));
        assert!(mailer.sent().is_empty());
    }

    #[test]
    fn send_requires_customer_email() {
        let registry = EmailRegistry::with_default_templates().unwrap();
        let mailer = InMemoryMailer::new();
        let dispatch = EmailDispatch {
            registry: &registry,
            mailer: &mailer,
            from: "billing@example.com",
        };

        let mut repo = repo_with(InvoiceStatus::Draft, None);
        repo.expect_update_invoice_status().times(0);

        let result = send_invoice(&repo, &dispatch, &billing_user(), 5);

        assert!(matches!(result, Err(ServiceError::Precondition(_))));
    }

    #[test]
    fn remind_only_for_open_invoices() {
        let registry = EmailRegistry::with_default_templates().unwrap();
        let mailer = InMemoryMailer::new();
        let dispatch = EmailDispatch {
            registry: &registry,
            mailer: &mailer,
            from: "billing@example.com",
        };

        let repo = repo_with(InvoiceStatus::Paid, Some("jane@example.com"));
        let result = remind_invoice(&repo, &dispatch, &billing_user(), 5);
        assert!(matches!(result, Err(ServiceError::Precondition(_))));

        let mut repo = repo_with(InvoiceStatus::Overdue, Some("jane@example.com"));
        repo.expect_create_activity()
            .times(1)
            .returning(|_| Ok(stored_activity()));
        let receipt = remind_invoice(&repo, &dispatch, &billing_user(), 5).unwrap();

        assert_eq!(receipt.template, EmailTemplate::PaymentReminder);
        assert_eq!(receipt.status, InvoiceStatus::Overdue);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[test]
    fn missing_invoice_is_not_found() {
        let registry = EmailRegistry::with_default_templates().unwrap();
        let mailer = InMemoryMailer::new();
        let dispatch = EmailDispatch {
            registry: &registry,
            mailer: &mailer,
            from: "billing@example.com",
        };

        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id().returning(|_, _| Ok(None));

        assert!(matches!(
            send_invoice(&repo, &dispatch, &billing_user(), 5),
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            remind_invoice(&repo, &dispatch, &billing_user(), 0),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn notifications_require_role() {
        let registry = EmailRegistry::with_default_templates().unwrap();
        let mailer = InMemoryMailer::new();
        let dispatch = EmailDispatch {
            registry: &registry,
            mailer: &mailer,
            from: "billing@example.com",
        };
        let mut repo = MockRepository::new();
        repo.expect_get_invoice_by_id().times(0);

        assert!(matches!(
            send_invoice(&repo, &dispatch, &outsider(), 5),
            Err(ServiceError::Unauthorized)
        ));
    }
}
