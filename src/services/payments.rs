use crate::domain::auth::AuthenticatedUser;
use crate::domain::payment::{Payment, PaymentListQuery};
use crate::forms::list::parse_list_query;
use crate::pagination::Page;
use crate::repository::PaymentReader;
use crate::services::{ServiceResult, authorize, into_page};

/// Returns one page of payments recorded against the caller's invoices.
pub fn list_payments<R>(
    repo: &R,
    user: &AuthenticatedUser,
    raw_query: &str,
) -> ServiceResult<Page<Payment>>
where
    R: PaymentReader + ?Sized,
{
    let owner = authorize(user)?;
    let query: PaymentListQuery = parse_list_query(raw_query)?;

    let listing = repo.list_payments(owner, &query).map_err(|err| {
        log::error!("Failed to list payments: {err}");
        err
    })?;

    Ok(into_page(listing, &query))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::Utc;

    use super::*;
    use crate::domain::payment::{PaymentMethod, PaymentStatus};
    use crate::domain::types::{InvoiceId, Money, PaymentId, UserId};
    use crate::repository::Listing;
    use crate::repository::errors::RepositoryResult;
    use crate::services::test_support::billing_user;

    struct FakeRepo {
        payments: Vec<Payment>,
        seen: RefCell<Option<PaymentListQuery>>,
    }

    impl PaymentReader for FakeRepo {
        fn list_payments(
            &self,
            _owner: UserId,
            query: &PaymentListQuery,
        ) -> RepositoryResult<Listing<Payment>> {
            self.seen.replace(Some(query.clone()));
            let matching: Vec<Payment> = self
                .payments
                .iter()
                .filter(|p| query.filter.status.is_none_or(|status| p.status == status))
                .cloned()
                .collect();
            Ok((matching.len(), matching))
        }
    }

    fn payment(id: i32, status: PaymentStatus) -> Payment {
        Payment {
            id: PaymentId::new(id).unwrap(),
            invoice_id: InvoiceId::new(1).unwrap(),
            amount: Money::from_cents(1_000).unwrap(),
            method: PaymentMethod::Card,
            status,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn filters_by_payment_status() {
        let repo = FakeRepo {
            payments: vec![
                payment(1, PaymentStatus::Paid),
                payment(2, PaymentStatus::Refunded),
                payment(3, PaymentStatus::Paid),
            ],
            seen: RefCell::new(None),
        };

        let page = list_payments(&repo, &billing_user(), "paymentStatus=paid").unwrap();

        assert_eq!(page.meta.total, 2);
        assert!(page.data.iter().all(|p| p.status == PaymentStatus::Paid));
        assert_eq!(
            repo.seen.borrow().as_ref().and_then(|q| q.filter.status),
            Some(PaymentStatus::Paid)
        );
    }
}
