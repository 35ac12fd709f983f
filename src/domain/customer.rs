use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::listing::{ListQuery, NoFilter, sort_field};
use crate::domain::types::{CustomerEmail, CustomerId, CustomerName, PhoneNumber, UserId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: UserId,
    pub name: CustomerName,
    pub email: Option<CustomerEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<String>,
    pub archived: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewCustomer {
    pub user_id: UserId,
    pub name: CustomerName,
    pub email: Option<CustomerEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<String>,
    pub archived: bool,
    pub created_at: NaiveDateTime,
}

impl NewCustomer {
    #[must_use]
    pub fn new(
        user_id: UserId,
        name: CustomerName,
        email: Option<CustomerEmail>,
        phone: Option<PhoneNumber>,
        address: Option<String>,
    ) -> Self {
        Self {
            user_id,
            name,
            email,
            phone,
            address: address
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            archived: false,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Overrides the creation timestamp, used by imports that carry history.
    #[must_use]
    pub fn created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = created_at;
        self
    }

    #[must_use]
    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }
}

sort_field!(
    /// Columns customers may be ordered by.
    CustomerSortField {
        default: CreatedAt,
        CreatedAt => "created_at",
        UpdatedAt => "updated_at",
        Name => "name",
        Email => "email",
    }
);

pub type CustomerListQuery = ListQuery<CustomerSortField, NoFilter>;
