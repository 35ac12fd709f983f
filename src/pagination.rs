//! The `{ data, meta }` envelope returned by every list endpoint.

use serde::{Deserialize, Serialize};

/// Builds the windowed list of page links shown under a table: a few pages at
/// each edge, a few around the current one, and `None` for every gap.
fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Totals describing where a page sits in the full result set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: usize,
    pub per_page: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

impl PageMeta {
    /// `total_pages` is `ceil(total / per_page)`, and `0` for a zero page size.
    pub fn new(total: usize, per_page: usize, current_page: usize) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page)
        };

        Self {
            total,
            per_page,
            current_page: current_page.max(1),
            total_pages,
        }
    }

    /// Page numbers to render as pagination links, `None` marking a gap.
    pub fn page_links(&self) -> Vec<Option<usize>> {
        get_pages(self.total_pages, self.current_page, 2, 2, 4, 2)
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// One page of a resource listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: usize, per_page: usize, current_page: usize) -> Self {
        Self {
            data,
            meta: PageMeta::new(total, per_page, current_page),
        }
    }

    /// Converts the rows while keeping the totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PageMeta::new(7, 5, 1).total_pages, 2);
        assert_eq!(PageMeta::new(10, 5, 1).total_pages, 2);
        assert_eq!(PageMeta::new(0, 5, 1).total_pages, 0);
        assert_eq!(PageMeta::new(1, 100, 1).total_pages, 1);
    }

    #[test]
    fn zero_page_size_has_no_pages() {
        assert_eq!(PageMeta::new(12, 0, 1).total_pages, 0);
    }

    #[test]
    fn meta_serializes_camel_case() {
        let page = Page::new(vec![1, 2], 7, 5, 2);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": [1, 2],
                "meta": { "total": 7, "perPage": 5, "currentPage": 2, "totalPages": 2 }
            })
        );
    }

    #[test]
    fn page_links_collapse_long_ranges() {
        let meta = PageMeta::new(200, 10, 10);
        assert_eq!(
            meta.page_links(),
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20),
            ]
        );
    }

    #[test]
    fn page_links_for_short_ranges_have_no_gaps() {
        let meta = PageMeta::new(30, 10, 1);
        assert_eq!(meta.page_links(), vec![Some(1), Some(2), Some(3)]);
        assert!(PageMeta::new(0, 10, 1).page_links().is_empty());
    }

    #[test]
    fn navigation_flags() {
        let meta = PageMeta::new(25, 10, 2);
        assert!(meta.has_next());
        assert!(meta.has_previous());
        assert!(!PageMeta::new(25, 10, 3).has_next());
    }
}
