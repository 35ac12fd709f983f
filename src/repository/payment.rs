use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::payment::{NewPayment, Payment, PaymentListQuery, PaymentSortField};
use crate::domain::types::UserId;
use crate::models::payment::{NewPayment as DbNewPayment, Payment as DbPayment};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, Listing, PaymentReader, PaymentWriter};
use crate::schema::{invoices, payments};

/// Payments are owned through their invoice, so the owner scope is a
/// sub-select over the caller's invoices.
fn filtered(owner: UserId, query: &PaymentListQuery) -> payments::BoxedQuery<'static, Sqlite> {
    let owned_invoices = invoices::table
        .filter(invoices::user_id.eq(owner.get()))
        .select(invoices::id);

    let mut items = payments::table
        .filter(payments::invoice_id.eq_any(owned_invoices))
        .into_boxed();

    if let Some(range) = query.created_between {
        items = items.filter(payments::created_at.ge(range.lower_bound()));
        if let Some(upper) = range.upper_bound() {
            items = items.filter(payments::created_at.lt(upper));
        }
    }

    if let Some(status) = query.filter.status {
        items = items.filter(payments::status.eq(status.as_str()));
    }

    if let Some(invoice_id) = query.filter.invoice_id {
        items = items.filter(payments::invoice_id.eq(invoice_id.get()));
    }

    items
}

impl PaymentReader for DieselRepository {
    fn list_payments(
        &self,
        owner: UserId,
        query: &PaymentListQuery,
    ) -> RepositoryResult<Listing<Payment>> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(owner, query).count().get_result(&mut conn)?;

        let items = filtered(owner, query);
        let order = query.sort.order;
        let items = match query.sort.field {
            PaymentSortField::CreatedAt => order_by!(items, payments::created_at, payments::id, order),
            PaymentSortField::Amount => order_by!(items, payments::amount_cents, payments::id, order),
            PaymentSortField::Status => order_by!(items, payments::status, payments::id, order),
            PaymentSortField::Method => order_by!(items, payments::method, payments::id, order),
        };
        let items = paginate!(items, query.pagination);

        let payments = items
            .load::<DbPayment>(&mut conn)?
            .into_iter()
            .map(Payment::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, payments))
    }
}

impl PaymentWriter for DieselRepository {
    fn create_payment(&self, new_payment: &NewPayment) -> RepositoryResult<Payment> {
        let mut conn = self.conn()?;
        let insertable: DbNewPayment = new_payment.into();

        let created = diesel::insert_into(payments::table)
            .values(&insertable)
            .get_result::<DbPayment>(&mut conn)?;

        Ok(Payment::try_from(created)?)
    }
}
