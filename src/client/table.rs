//! Renders a fetched page into header, body and pagination rows.
//!
//! Ordering across pages is the server's job. When a [`SortConfig`] is set
//! the rows of the current page are additionally re-sorted for display, so a
//! header click shows its effect before the refetch arrives.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use crate::domain::listing::SortOrder;
use crate::pagination::{Page, PageMeta};

type Renderer<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// One table column. `key` is the field name in the row's JSON form.
pub struct Column<T> {
    pub key: String,
    pub title: String,
    pub sortable: bool,
    render: Option<Renderer<T>>,
}

impl<T> Column<T> {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            sortable: false,
            render: None,
        }
    }

    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Replaces the default cell formatting.
    #[must_use]
    pub fn render_with(mut self, render: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Box::new(render));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    pub key: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub title: String,
    pub sortable: bool,
    /// Direction arrow for the active sort column.
    pub indicator: Option<SortOrder>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    Rows(Vec<Vec<String>>),
    /// Single row spanning every column.
    Empty { message: String, colspan: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<HeaderCell>,
    pub body: TableBody,
    pub pagination: Vec<Option<usize>>,
    pub meta: PageMeta,
}

pub struct TableView<T> {
    columns: Vec<Column<T>>,
    sort: Option<SortConfig>,
    empty_message: String,
}

impl<T: Serialize> TableView<T> {
    pub fn new(columns: Vec<Column<T>>) -> Self {
        Self {
            columns,
            sort: None,
            empty_message: "No records found".to_string(),
        }
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Option<SortConfig>) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn sort(&self) -> Option<&SortConfig> {
        self.sort.as_ref()
    }

    /// Header click: a new column sorts descending, the active one flips.
    pub fn toggle_sort(&mut self, key: &str) -> Option<&SortConfig> {
        if !self.columns.iter().any(|c| c.key == key && c.sortable) {
            return self.sort.as_ref();
        }
        let order = match &self.sort {
            Some(current) if current.key == key => current.order.reverse(),
            _ => SortOrder::Desc,
        };
        self.sort = Some(SortConfig {
            key: key.to_string(),
            order,
        });
        self.sort.as_ref()
    }

    pub fn render(&self, page: &Page<T>) -> RenderedTable {
        let headers = self
            .columns
            .iter()
            .map(|column| HeaderCell {
                key: column.key.clone(),
                title: column.title.clone(),
                sortable: column.sortable,
                indicator: self
                    .sort
                    .as_ref()
                    .filter(|sort| sort.key == column.key)
                    .map(|sort| sort.order),
            })
            .collect();

        let body = if page.data.is_empty() {
            TableBody::Empty {
                message: self.empty_message.clone(),
                colspan: self.columns.len().max(1),
            }
        } else {
            TableBody::Rows(self.rows(&page.data))
        };

        RenderedTable {
            headers,
            body,
            pagination: page.meta.page_links(),
            meta: page.meta,
        }
    }

    fn rows(&self, data: &[T]) -> Vec<Vec<String>> {
        let mut rows: Vec<(&T, Value)> = data
            .iter()
            .map(|row| {
                let value = serde_json::to_value(row).unwrap_or_else(|err| {
                    log::warn!("Row could not be converted for display: {err}");
                    Value::Null
                });
                (row, value)
            })
            .collect();

        if let Some(sort) = &self.sort {
            rows.sort_by(|(_, a), (_, b)| {
                let ordering = compare_values(
                    a.get(&sort.key).unwrap_or(&Value::Null),
                    b.get(&sort.key).unwrap_or(&Value::Null),
                );
                match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        rows.iter()
            .map(|(row, value)| {
                self.columns
                    .iter()
                    .map(|column| match &column.render {
                        Some(render) => render(row),
                        None => format_cell(value.get(&column.key).unwrap_or(&Value::Null)),
                    })
                    .collect()
            })
            .collect()
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Ascending order of two cell values: nulls first, numbers (including
/// numeric strings such as money amounts) by value, everything else by
/// case-insensitive text.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => format_cell(a)
                .to_lowercase()
                .cmp(&format_cell(b).to_lowercase()),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
        amount: &'static str,
        email: Option<&'static str>,
    }

    fn columns() -> Vec<Column<Row>> {
        vec![
            Column::new("name", "Name").sortable(),
            Column::new("amount", "Amount").sortable(),
            Column::new("email", "Email"),
        ]
    }

    fn page(data: Vec<Row>) -> Page<Row> {
        let total = data.len();
        Page::new(data, total, 10, 1)
    }

    #[test]
    fn numeric_strings_compare_by_value() {
        assert_eq!(compare_values(&json!("9.50"), &json!("10.00")), Ordering::Less);
        assert_eq!(compare_values(&json!(2), &json!("10")), Ordering::Less);
    }

    #[test]
    fn text_compares_case_insensitively_and_nulls_first() {
        assert_eq!(compare_values(&json!("alice"), &json!("Bob")), Ordering::Less);
        assert_eq!(compare_values(&Value::Null, &json!("a")), Ordering::Less);
        assert_eq!(compare_values(&json!("a"), &Value::Null), Ordering::Greater);
    }

    #[test]
    fn empty_page_spans_all_columns() {
        let table = TableView::new(columns()).with_empty_message("No payments yet");

        let rendered = table.render(&page(vec![]));

        assert_eq!(
            rendered.body,
            TableBody::Empty {
                message: "No payments yet".to_string(),
                colspan: 3,
            }
        );
        assert!(rendered.pagination.is_empty());
    }

    #[test]
    fn rows_are_resorted_within_page() {
        let table = TableView::new(columns()).with_sort(Some(SortConfig {
            key: "amount".to_string(),
            order: SortOrder::Desc,
        }));

        let rendered = table.render(&page(vec![
            Row { name: "Acme", amount: "9.50", email: None },
            Row { name: "Globex", amount: "120.00", email: Some("ap@globex.test") },
            Row { name: "Initech", amount: "10.00", email: None },
        ]));

        let TableBody::Rows(rows) = rendered.body else {
            panic!("expected rows");
        };
        let names: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["Globex", "Initech", "Acme"]);
        assert_eq!(rows[0][2], "ap@globex.test");
        assert_eq!(rows[1][2], "");
        assert_eq!(rendered.headers[1].indicator, Some(SortOrder::Desc));
        assert_eq!(rendered.headers[0].indicator, None);
    }

    #[test]
    fn custom_renderer_overrides_cell() {
        let table = TableView::new(vec![
            Column::new("name", "Name").render_with(|row: &Row| row.name.to_uppercase()),
        ]);

        let rendered = table.render(&page(vec![Row { name: "Acme", amount: "1.00", email: None }]));

        assert_eq!(rendered.body, TableBody::Rows(vec![vec!["ACME".to_string()]]));
    }

    #[test]
    fn toggling_sort_flips_active_column() {
        let mut table = TableView::new(columns());

        assert_eq!(table.toggle_sort("name").unwrap().order, SortOrder::Desc);
        assert_eq!(table.toggle_sort("name").unwrap().order, SortOrder::Asc);
        assert_eq!(table.toggle_sort("amount").unwrap().order, SortOrder::Desc);
        // Not sortable: unchanged.
        assert_eq!(table.toggle_sort("email").unwrap().key, "amount");
    }
}
