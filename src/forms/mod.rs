//! Request payload parsing and validation for the billing routes.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

pub mod list;

/// A single rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
/// Errors produced while turning a raw query string into a typed query.
pub enum QueryError {
    /// The query string itself could not be decoded.
    #[error("malformed query string: {0}")]
    Malformed(String),

    /// One or more fields failed their declared shape.
    #[error("invalid query parameters: {}", join_fields(.0))]
    Invalid(Vec<FieldError>),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl QueryError {
    /// Field-level messages grouped by field name, as rendered in responses.
    pub fn field_messages(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        match self {
            QueryError::Malformed(message) => {
                grouped
                    .entry("query".to_string())
                    .or_default()
                    .push(message.clone());
            }
            QueryError::Invalid(errors) => {
                for error in errors {
                    grouped
                        .entry(error.field.clone())
                        .or_default()
                        .push(error.message.clone());
                }
            }
        }
        grouped
    }
}

/// Flattens `validator` errors into [`FieldError`]s sorted by field.
pub(crate) fn field_errors_from(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut flattened: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| error.code.to_string());
                FieldError::new(field.to_string(), message)
            })
        })
        .collect();
    flattened.sort_by(|a, b| a.field.cmp(&b.field));
    flattened
}
