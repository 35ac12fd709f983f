use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::customer::{Customer, CustomerListQuery, CustomerSortField, NewCustomer};
use crate::domain::types::{CustomerId, UserId};
use crate::models::customer::{Customer as DbCustomer, NewCustomer as DbNewCustomer};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CustomerReader, CustomerWriter, DieselRepository, Listing};
use crate::schema::customers;

/// Substring `LIKE` pattern for `term`; its own wildcards are escaped with a backslash.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Owner-scoped customers matching every filter of `query`, unordered.
fn filtered(owner: UserId, query: &CustomerListQuery) -> customers::BoxedQuery<'static, Sqlite> {
    let mut items = customers::table
        .filter(customers::user_id.eq(owner.get()))
        .into_boxed();

    if let Some(range) = query.created_between {
        items = items.filter(customers::created_at.ge(range.lower_bound()));
        if let Some(upper) = range.upper_bound() {
            items = items.filter(customers::created_at.lt(upper));
        }
    }

    if let Some(archived) = query.archived {
        items = items.filter(customers::archived.eq(archived));
    }

    if let Some(term) = &query.search {
        let pattern = like_pattern(term);
        items = items.filter(
            customers::name
                .like(pattern.clone())
                .escape('\\')
                .or(customers::email.like(pattern.clone()).escape('\\'))
                .or(customers::phone.like(pattern.clone()).escape('\\'))
                .or(customers::address.like(pattern).escape('\\')),
        );
    }

    items
}

impl CustomerReader for DieselRepository {
    fn get_customer_by_id(
        &self,
        id: CustomerId,
        owner: UserId,
    ) -> RepositoryResult<Option<Customer>> {
        let mut conn = self.conn()?;
        let customer = customers::table
            .filter(customers::id.eq(id.get()))
            .filter(customers::user_id.eq(owner.get()))
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        customer
            .map(Customer::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_customers(
        &self,
        owner: UserId,
        query: &CustomerListQuery,
    ) -> RepositoryResult<Listing<Customer>> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(owner, query).count().get_result(&mut conn)?;

        let items = filtered(owner, query);
        let items = match query.sort.field {
            CustomerSortField::CreatedAt => {
                order_by!(items, customers::created_at, customers::id, query.sort.order)
            }
            CustomerSortField::UpdatedAt => {
                order_by!(items, customers::updated_at, customers::id, query.sort.order)
            }
            CustomerSortField::Name => {
                order_by!(items, customers::name, customers::id, query.sort.order)
            }
            CustomerSortField::Email => {
                order_by!(items, customers::email, customers::id, query.sort.order)
            }
        };
        let items = paginate!(items, query.pagination);

        let customers = items
            .load::<DbCustomer>(&mut conn)?
            .into_iter()
            .map(Customer::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, customers))
    }
}

impl CustomerWriter for DieselRepository {
    fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer> {
        let mut conn = self.conn()?;
        let insertable: DbNewCustomer = new_customer.into();

        let created = diesel::insert_into(customers::table)
            .values(&insertable)
            .get_result::<DbCustomer>(&mut conn)?;

        Ok(Customer::try_from(created)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("acme"), "%acme%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }
}
