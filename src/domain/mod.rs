//! Domain aggregates exposed by the billing service layer.

pub mod activity;
pub mod auth;
pub mod customer;
pub mod invoice;
pub mod job;
pub mod listing;
pub mod payment;
pub mod types;
