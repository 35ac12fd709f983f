//! DTO modules that bridge services with the JSON API and CSV exports.

pub mod api;
pub mod export;
