//! Database models shared across the billing repository.

pub mod activity;
pub mod customer;
pub mod invoice;
pub mod job;
pub mod payment;

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod zmq;
