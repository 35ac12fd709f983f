use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::customer::{Customer as DomainCustomer, NewCustomer as DomainNewCustomer};
use crate::domain::types::{
    CustomerEmail, CustomerId, CustomerName, PhoneNumber, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::customers)]
/// Diesel model for [`crate::domain::customer::Customer`].
pub struct Customer {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::customers)]
/// Insertable form of [`Customer`].
pub struct NewCustomer<'a> {
    pub user_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Customer> for DomainCustomer {
    type Error = TypeConstraintError;

    fn try_from(customer: Customer) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CustomerId::new(customer.id)?,
            user_id: UserId::new(customer.user_id)?,
            name: CustomerName::new(customer.name)?,
            email: customer.email.map(CustomerEmail::new).transpose()?,
            phone: customer.phone.map(PhoneNumber::new).transpose()?,
            address: customer.address,
            archived: customer.archived,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewCustomer> for NewCustomer<'a> {
    fn from(customer: &'a DomainNewCustomer) -> Self {
        Self {
            user_id: customer.user_id.get(),
            name: customer.name.as_str(),
            email: customer.email.as_ref().map(CustomerEmail::as_str),
            phone: customer.phone.as_ref().map(PhoneNumber::as_str),
            address: customer.address.as_deref(),
            archived: customer.archived,
            created_at: customer.created_at,
            updated_at: customer.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn db_customer() -> Customer {
        let now = Utc::now().naive_utc();
        Customer {
            id: 1,
            user_id: 2,
            name: "Acme".to_string(),
            email: Some("billing@acme.test".to_string()),
            phone: Some("+14155552671".to_string()),
            address: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn customer_into_domain() {
        let db = db_customer();
        let domain = DomainCustomer::try_from(db.clone()).unwrap();
        assert_eq!(domain.id.get(), 1);
        assert_eq!(domain.user_id.get(), 2);
        assert_eq!(domain.name.as_str(), "Acme");
        assert_eq!(
            domain.email.as_ref().map(CustomerEmail::as_str),
            Some("billing@acme.test")
        );
        assert_eq!(domain.created_at, db.created_at);
    }

    #[test]
    fn invalid_stored_email_is_rejected() {
        let db = Customer {
            email: Some("broken".to_string()),
            ..db_customer()
        };
        assert_eq!(
            DomainCustomer::try_from(db),
            Err(TypeConstraintError::InvalidEmail)
        );
    }

    #[test]
    fn from_domain_new_creates_insertable() {
        let domain = DomainNewCustomer::new(
            UserId::new(5).unwrap(),
            CustomerName::new("Bob").unwrap(),
            None,
            None,
            Some("  12 Main St ".to_string()),
        );
        let new: NewCustomer = (&domain).into();
        assert_eq!(new.user_id, 5);
        assert_eq!(new.name, "Bob");
        assert_eq!(new.address, Some("12 Main St"));
        assert_eq!(new.created_at, new.updated_at);
    }
}
