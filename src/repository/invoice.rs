use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::invoice::{Invoice, InvoiceListQuery, InvoiceSortField, InvoiceStatus, NewInvoice};
use crate::domain::types::{InvoiceId, UserId};
use crate::models::invoice::{Invoice as DbInvoice, NewInvoice as DbNewInvoice};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, InvoiceReader, InvoiceWriter, Listing};
use crate::schema::invoices;

fn filtered(owner: UserId, query: &InvoiceListQuery) -> invoices::BoxedQuery<'static, Sqlite> {
    let mut items = invoices::table
        .filter(invoices::user_id.eq(owner.get()))
        .into_boxed();

    if let Some(range) = query.created_between {
        items = items.filter(invoices::created_at.ge(range.lower_bound()));
        if let Some(upper) = range.upper_bound() {
            items = items.filter(invoices::created_at.lt(upper));
        }
    }

    if let Some(archived) = query.archived {
        items = items.filter(invoices::archived.eq(archived));
    }

    if let Some(status) = query.filter.status {
        items = items.filter(invoices::status.eq(status.as_str()));
    }

    if let Some(customer_id) = query.filter.customer_id {
        items = items.filter(invoices::customer_id.eq(customer_id.get()));
    }

    items
}

impl InvoiceReader for DieselRepository {
    fn get_invoice_by_id(&self, id: InvoiceId, owner: UserId) -> RepositoryResult<Option<Invoice>> {
        let mut conn = self.conn()?;
        let invoice = invoices::table
            .filter(invoices::id.eq(id.get()))
            .filter(invoices::user_id.eq(owner.get()))
            .first::<DbInvoice>(&mut conn)
            .optional()?;

        invoice
            .map(Invoice::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_invoices(
        &self,
        owner: UserId,
        query: &InvoiceListQuery,
    ) -> RepositoryResult<Listing<Invoice>> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(owner, query).count().get_result(&mut conn)?;

        let items = filtered(owner, query);
        let order = query.sort.order;
        let items = match query.sort.field {
            InvoiceSortField::CreatedAt => order_by!(items, invoices::created_at, invoices::id, order),
            InvoiceSortField::UpdatedAt => order_by!(items, invoices::updated_at, invoices::id, order),
            InvoiceSortField::Number => order_by!(items, invoices::number, invoices::id, order),
            InvoiceSortField::Status => order_by!(items, invoices::status, invoices::id, order),
            InvoiceSortField::Amount => order_by!(items, invoices::amount_cents, invoices::id, order),
            InvoiceSortField::DueDate => order_by!(items, invoices::due_date, invoices::id, order),
        };
        let items = paginate!(items, query.pagination);

        let invoices = items
            .load::<DbInvoice>(&mut conn)?
            .into_iter()
            .map(Invoice::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, invoices))
    }
}

impl InvoiceWriter for DieselRepository {
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice> {
        let mut conn = self.conn()?;
        let insertable: DbNewInvoice = new_invoice.into();

        let created = diesel::insert_into(invoices::table)
            .values(&insertable)
            .get_result::<DbInvoice>(&mut conn)?;

        Ok(Invoice::try_from(created)?)
    }

    fn update_invoice_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> RepositoryResult<Invoice> {
        let mut conn = self.conn()?;

        let updated = diesel::update(invoices::table.find(id.get()))
            .set((
                invoices::status.eq(status.as_str()),
                invoices::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbInvoice>(&mut conn)?;

        Ok(Invoice::try_from(updated)?)
    }
}
