//! Typed list query shared by every resource listing.
//!
//! A [`ListQuery`] is the validated form of the page query string: which page,
//! how it is ordered and which records are filtered in. The per-resource parts
//! are the sort field allow-list `S` and the equality filters `F`.

use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::str_enum;

/// Page used when the query string does not specify one.
pub const DEFAULT_PAGE: usize = 1;
/// Page size used when the query string does not specify one.
pub const DEFAULT_PER_PAGE: usize = 10;

str_enum!(
    /// Direction of the requested ordering.
    SortOrder {
        Asc => "asc",
        Desc => "desc",
    }
);

impl SortOrder {
    /// Flips the direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// Reads a `startDate`/`endDate` value: a plain `YYYY-MM-DD` day or an
/// RFC 3339 timestamp, of which only the date is kept.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Columns a resource may be ordered by.
///
/// Implementors are closed enums, so an unknown `sortBy` never reaches the
/// persistence layer.
pub trait SortField: Copy + Debug + PartialEq + Sized {
    /// Wire names accepted for `sortBy`.
    const ALLOWED: &'static [&'static str];

    /// Looks up a field by its wire name.
    fn parse(name: &str) -> Option<Self>;

    /// Field used when `sortBy` is absent (`created_at` for every resource).
    fn default_field() -> Self;
}

/// Declares a resource's sortable columns together with their wire names.
macro_rules! sort_field {
    ($(#[$meta:meta])* $name:ident { default: $default:ident, $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum $name {
            $($variant,)+
        }

        impl $crate::domain::listing::SortField for $name {
            const ALLOWED: &'static [&'static str] = &[$($value),+];

            fn parse(name: &str) -> Option<Self> {
                match name {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn default_field() -> Self {
                Self::$default
            }
        }
    };
}

pub(crate) use sort_field;

/// Requested ordering: a field and a direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sort<S> {
    pub field: S,
    pub order: SortOrder,
}

impl<S: SortField> Default for Sort<S> {
    fn default() -> Self {
        Self {
            field: S::default_field(),
            order: SortOrder::default(),
        }
    }
}

/// Inclusive range of calendar days matched against `created_at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// First instant inside the range.
    pub fn lower_bound(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// First instant after the range, `None` when the end is the last
    /// representable day.
    pub fn upper_bound(&self) -> Option<NaiveDateTime> {
        self.end.succ_opt().map(|day| day.and_time(NaiveTime::MIN))
    }

    /// Whether the timestamp falls inside the range.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.lower_bound() && self.upper_bound().is_none_or(|upper| at < upper)
    }
}

/// Offset pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Number of rows skipped before this page, `None` when it overflows.
    pub fn offset(&self) -> Option<usize> {
        self.page.max(1).saturating_sub(1).checked_mul(self.per_page)
    }

    /// `LIMIT` and `OFFSET` for SQL. An offset past `i64::MAX` lies beyond
    /// every row, so it is clamped there instead of wrapping.
    pub fn limit_offset(&self) -> (i64, i64) {
        let limit = i64::try_from(self.per_page).unwrap_or(i64::MAX);
        let offset = self
            .offset()
            .and_then(|offset| i64::try_from(offset).ok())
            .unwrap_or(i64::MAX);
        (limit, offset)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Filters shared by all resources plus the resource specific ones in `F`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery<S, F> {
    pub pagination: Option<Pagination>,
    pub search: Option<String>,
    pub created_between: Option<DateRange>,
    pub archived: Option<bool>,
    pub sort: Sort<S>,
    pub filter: F,
}

impl<S: SortField, F: Default> Default for ListQuery<S, F> {
    fn default() -> Self {
        Self {
            pagination: Some(Pagination::default()),
            search: None,
            created_between: None,
            archived: None,
            sort: Sort::default(),
            filter: F::default(),
        }
    }
}

impl<S: SortField, F: Default> ListQuery<S, F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }

    /// Drops the pagination window so every matching row is returned.
    pub fn without_pagination(mut self) -> Self {
        self.pagination = None;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn created_between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.created_between = Some(DateRange::new(start, end));
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    pub fn sort_by(mut self, field: S, order: SortOrder) -> Self {
        self.sort = Sort { field, order };
        self
    }

    pub fn filter(mut self, filter: F) -> Self {
        self.filter = filter;
        self
    }
}

/// Filter type for resources without resource specific parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFilter;
