//! Validation of the page query string shared by every list endpoint.
//!
//! Parsing either yields a complete [`ListQuery`] or a [`QueryError`] listing
//! every offending field; a partially valid query is never applied.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use validator::Validate;

use crate::domain::activity::{ActivityFilter, SubjectType};
use crate::domain::invoice::{InvoiceFilter, InvoiceStatus};
use crate::domain::job::{JobFilter, JobStatus};
use crate::domain::listing::{
    DEFAULT_PAGE, DEFAULT_PER_PAGE, DateRange, ListQuery, NoFilter, Pagination, Sort, SortField,
    SortOrder, parse_iso_date,
};
use crate::domain::payment::{PaymentFilter, PaymentStatus};
use crate::domain::types::{CustomerId, InvoiceId};
use crate::forms::{FieldError, QueryError, field_errors_from};

/// Decoded query string. The last occurrence of a key wins and blank values
/// are treated as absent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawQuery(BTreeMap<String, String>);

impl RawQuery {
    pub fn parse(query: &str) -> Result<Self, QueryError> {
        let pairs: Vec<(String, String)> = serde_html_form::from_str(query)
            .map_err(|e| QueryError::Malformed(e.to_string()))?;

        let values = pairs
            .into_iter()
            .map(|(key, value)| (key, value.trim().to_string()))
            .filter(|(_, value)| !value.is_empty())
            .collect();

        Ok(Self(values))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Resource specific equality filters read from the same query string.
pub trait ListFilter: Default + Sized {
    fn parse(raw: &RawQuery, errors: &mut Vec<FieldError>) -> Self;
}

/// Range checks declared on the coerced numeric and text fields.
#[derive(Debug, Validate)]
struct PageParams {
    #[validate(range(min = 1, message = "must be at least 1"))]
    page: usize,
    #[validate(range(min = 1, message = "must be at least 1"))]
    per_page: usize,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    search: Option<String>,
}

/// Converts a Rust field name into the camelCase name used on the wire.
fn wire_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            name.extend(ch.to_uppercase());
            upper = false;
        } else {
            name.push(ch);
        }
    }
    name
}

fn one_of(allowed: &[&str]) -> String {
    format!("must be one of: {}", allowed.join(", "))
}

fn parse_number(
    raw: &RawQuery,
    key: &str,
    default: usize,
    errors: &mut Vec<FieldError>,
) -> usize {
    match raw.get(key) {
        None => default,
        Some(value) => value.parse::<usize>().unwrap_or_else(|_| {
            errors.push(FieldError::new(key, "must be a positive integer"));
            default
        }),
    }
}

fn parse_bool(raw: &RawQuery, key: &str, errors: &mut Vec<FieldError>) -> Option<bool> {
    match raw.get(key)? {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => {
            errors.push(FieldError::new(key, "must be true or false"));
            None
        }
    }
}

fn parse_date(raw: &RawQuery, key: &str, errors: &mut Vec<FieldError>) -> Option<NaiveDate> {
    let value = raw.get(key)?;
    let parsed = parse_iso_date(value);

    if parsed.is_none() {
        errors.push(FieldError::new(key, "must be an ISO date (YYYY-MM-DD)"));
    }
    parsed
}

fn parse_enum<T: FromStr>(
    raw: &RawQuery,
    key: &str,
    allowed: &[&str],
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let value = raw.get(key)?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.push(FieldError::new(key, one_of(allowed)));
            None
        }
    }
}

fn parse_id<T>(raw: &RawQuery, key: &str, errors: &mut Vec<FieldError>) -> Option<T>
where
    T: TryFrom<i32>,
{
    let value = raw.get(key)?;
    match value.parse::<i32>().ok().and_then(|id| T::try_from(id).ok()) {
        Some(id) => Some(id),
        None => {
            errors.push(FieldError::new(key, "must be a positive identifier"));
            None
        }
    }
}

fn parse_sort<S: SortField>(raw: &RawQuery, errors: &mut Vec<FieldError>) -> Sort<S> {
    let field = match raw.get("sortBy") {
        None => S::default_field(),
        Some(name) => S::parse(name).unwrap_or_else(|| {
            errors.push(FieldError::new("sortBy", one_of(S::ALLOWED)));
            S::default_field()
        }),
    };
    let order = parse_enum::<SortOrder>(raw, "sortOrder", SortOrder::VALUES, errors)
        .unwrap_or_default();

    Sort { field, order }
}

/// Parses and validates a raw query string into a typed list query.
pub fn parse_list_query<S, F>(query: &str) -> Result<ListQuery<S, F>, QueryError>
where
    S: SortField,
    F: ListFilter,
{
    let raw = RawQuery::parse(query)?;
    let mut errors = Vec::new();

    let params = PageParams {
        page: parse_number(&raw, "page", DEFAULT_PAGE, &mut errors),
        per_page: parse_number(&raw, "perPage", DEFAULT_PER_PAGE, &mut errors),
        search: raw.get("search").map(str::to_string),
    };

    let start = parse_date(&raw, "startDate", &mut errors);
    let end = parse_date(&raw, "endDate", &mut errors);
    let archived = parse_bool(&raw, "archived", &mut errors);
    let sort = parse_sort::<S>(&raw, &mut errors);
    let filter = F::parse(&raw, &mut errors);

    if let Err(validation) = params.validate() {
        errors.extend(
            field_errors_from(&validation)
                .into_iter()
                .map(|error| FieldError::new(wire_name(&error.field), error.message)),
        );
    }

    if !errors.is_empty() {
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        return Err(QueryError::Invalid(errors));
    }

    let created_between = match (start, end) {
        (Some(start), Some(end)) => Some(DateRange::new(start, end)),
        _ => None,
    };

    Ok(ListQuery {
        pagination: Some(Pagination {
            page: params.page,
            per_page: params.per_page,
        }),
        search: params.search,
        created_between,
        archived,
        sort,
        filter,
    })
}

impl ListFilter for NoFilter {
    fn parse(_raw: &RawQuery, _errors: &mut Vec<FieldError>) -> Self {
        NoFilter
    }
}

impl ListFilter for JobFilter {
    fn parse(raw: &RawQuery, errors: &mut Vec<FieldError>) -> Self {
        Self {
            status: parse_enum::<JobStatus>(raw, "status", JobStatus::VALUES, errors),
            customer_id: parse_id::<CustomerId>(raw, "customerId", errors),
        }
    }
}

impl ListFilter for InvoiceFilter {
    fn parse(raw: &RawQuery, errors: &mut Vec<FieldError>) -> Self {
        Self {
            status: parse_enum::<InvoiceStatus>(raw, "status", InvoiceStatus::VALUES, errors),
            customer_id: parse_id::<CustomerId>(raw, "customerId", errors),
        }
    }
}

impl ListFilter for PaymentFilter {
    fn parse(raw: &RawQuery, errors: &mut Vec<FieldError>) -> Self {
        Self {
            status: parse_enum::<PaymentStatus>(
                raw,
                "paymentStatus",
                PaymentStatus::VALUES,
                errors,
            ),
            invoice_id: parse_id::<InvoiceId>(raw, "invoiceId", errors),
        }
    }
}

impl ListFilter for ActivityFilter {
    fn parse(raw: &RawQuery, errors: &mut Vec<FieldError>) -> Self {
        Self {
            subject_type: parse_enum::<SubjectType>(
                raw,
                "subjectType",
                SubjectType::VALUES,
                errors,
            ),
        }
    }
}
