//! Keeps a table's list query, the URL query string and the fetched page in
//! step.
//!
//! [`ListParams`] is the single source of truth: every operation edits it,
//! serializes it with [`ListParams::query_string`] and dispatches a fetch.
//! Each dispatch takes a sequence number and only the response of the most
//! recently dispatched request is applied; older responses are dropped when
//! they arrive, so a slow stale response can never overwrite newer state.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::client::ClientError;
use crate::domain::listing::{DEFAULT_PAGE, DEFAULT_PER_PAGE, SortOrder, parse_iso_date};
use crate::pagination::Page;

/// Delay after the last keystroke before a search is dispatched.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Page sizes offered by the rows-per-page selector.
pub const ROWS_PER_PAGE_OPTIONS: [usize; 5] = [5, 10, 20, 50, 100];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The list query as carried in the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: usize,
    pub per_page: usize,
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub archived: Option<bool>,
    /// Resource specific filters such as `paymentStatus`.
    pub filters: BTreeMap<String, String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            search: None,
            start_date: None,
            end_date: None,
            sort_by: "created_at".to_string(),
            sort_order: SortOrder::default(),
            archived: None,
            filters: BTreeMap::new(),
        }
    }
}

impl ListParams {
    fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("perPage".to_string(), self.per_page.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("startDate".to_string(), start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate".to_string(), end.format(DATE_FORMAT).to_string()));
        }
        pairs.push(("sortBy".to_string(), self.sort_by.clone()));
        pairs.push(("sortOrder".to_string(), self.sort_order.to_string()));
        if let Some(archived) = self.archived {
            pairs.push(("archived".to_string(), archived.to_string()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }

    /// Serializes the parameters in a stable key order.
    pub fn query_string(&self) -> String {
        serde_html_form::to_string(self.pairs()).unwrap_or_else(|err| {
            log::error!("Failed to encode list parameters: {err}");
            String::new()
        })
    }

    /// Restores parameters from a URL query string.
    ///
    /// Values the server would reject fall back to their defaults; keys that
    /// are not common list parameters are kept as resource filters.
    pub fn from_query_string(query: &str) -> Result<Self, ClientError> {
        let pairs: Vec<(String, String)> =
            serde_html_form::from_str(query).map_err(|e| ClientError::Query(e.to_string()))?;

        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "page" => {
                    if let Some(page) = value.parse::<usize>().ok().filter(|page| *page >= 1) {
                        params.page = page;
                    }
                }
                "perPage" => {
                    if let Some(per_page) = value.parse::<usize>().ok().filter(|size| *size >= 1) {
                        params.per_page = per_page;
                    }
                }
                "search" => params.search = Some(value.to_string()),
                "startDate" => params.start_date = parse_iso_date(value),
                "endDate" => params.end_date = parse_iso_date(value),
                "sortBy" => params.sort_by = value.to_string(),
                "sortOrder" => params.sort_order = value.parse().unwrap_or_default(),
                "archived" => params.archived = value.parse().ok(),
                _ => {
                    params.filters.insert(key, value.to_string());
                }
            }
        }
        Ok(params)
    }
}

/// Retrieves one page for a query string.
#[async_trait]
pub trait PageFetcher<T: Send>: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<Page<T>, ClientError>;
}

/// What happened to a dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response became the current page.
    Applied,
    /// A newer request was dispatched meanwhile; nothing changed.
    Superseded,
}

struct SyncState<T> {
    params: ListParams,
    page: Option<Page<T>>,
    last_error: Option<String>,
    dispatched: u64,
    in_flight: usize,
    search_generation: u64,
}

fn lock<T>(state: &Mutex<SyncState<T>>) -> MutexGuard<'_, SyncState<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a request as in flight until dropped, including when the awaiting
/// future is cancelled.
struct InFlight<'a, T> {
    state: &'a Mutex<SyncState<T>>,
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

/// Query state of one table plus the fetcher it loads pages through.
pub struct QuerySync<T, F> {
    fetcher: F,
    debounce: Duration,
    state: Mutex<SyncState<T>>,
}

impl<T, F> QuerySync<T, F>
where
    T: Clone + Send,
    F: PageFetcher<T>,
{
    pub fn new(fetcher: F, params: ListParams) -> Self {
        Self {
            fetcher,
            debounce: SEARCH_DEBOUNCE,
            state: Mutex::new(SyncState {
                params,
                page: None,
                last_error: None,
                dispatched: 0,
                in_flight: 0,
                search_generation: 0,
            }),
        }
    }

    /// Starts from the parameters found in the current URL.
    pub fn from_query_string(fetcher: F, query: &str) -> Result<Self, ClientError> {
        Ok(Self::new(fetcher, ListParams::from_query_string(query)?))
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn params(&self) -> ListParams {
        lock(&self.state).params.clone()
    }

    /// Query string to mirror into the URL.
    pub fn query_string(&self) -> String {
        lock(&self.state).params.query_string()
    }

    /// Most recently applied page.
    pub fn page(&self) -> Option<Page<T>> {
        lock(&self.state).page.clone()
    }

    /// Error of the most recent request, cleared by the next applied page.
    pub fn last_error(&self) -> Option<String> {
        lock(&self.state).last_error.clone()
    }

    /// `true` while any dispatched request has not completed.
    pub fn is_loading(&self) -> bool {
        lock(&self.state).in_flight > 0
    }

    /// Fetches the page for the current parameters.
    pub async fn refresh(&self) -> Result<FetchOutcome, ClientError> {
        self.dispatch().await
    }

    pub async fn change_page(&self, page: usize) -> Result<FetchOutcome, ClientError> {
        self.update(|params| params.page = page.max(1));
        self.dispatch().await
    }

    /// Changes the page size and returns to the first page.
    pub async fn change_rows(&self, per_page: usize) -> Result<FetchOutcome, ClientError> {
        self.update(|params| {
            params.per_page = per_page.max(1);
            params.page = 1;
        });
        self.dispatch().await
    }

    /// Changes the creation date window and returns to the first page.
    pub async fn change_dates(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<FetchOutcome, ClientError> {
        self.update(|params| {
            params.start_date = start;
            params.end_date = end;
            params.page = 1;
        });
        self.dispatch().await
    }

    pub async fn change_sort(
        &self,
        field: impl Into<String>,
        order: SortOrder,
    ) -> Result<FetchOutcome, ClientError> {
        let field = field.into();
        self.update(|params| {
            params.sort_by = field;
            params.sort_order = order;
        });
        self.dispatch().await
    }

    /// Sets or clears a resource filter and returns to the first page.
    pub async fn change_filter(
        &self,
        key: impl Into<String>,
        value: Option<String>,
    ) -> Result<FetchOutcome, ClientError> {
        let key = key.into();
        self.update(|params| {
            match value.filter(|v| !v.trim().is_empty()) {
                Some(value) => params.filters.insert(key, value),
                None => params.filters.remove(&key),
            };
            params.page = 1;
        });
        self.dispatch().await
    }

    /// Debounced search: only the last term typed within the debounce window
    /// is applied (resetting to the first page) and fetched.
    pub async fn search_table(&self, term: impl Into<String>) -> Result<FetchOutcome, ClientError> {
        let term = term.into();
        let generation = {
            let mut state = lock(&self.state);
            state.search_generation += 1;
            state.search_generation
        };

        tokio::time::sleep(self.debounce).await;

        {
            let mut state = lock(&self.state);
            if state.search_generation != generation {
                return Ok(FetchOutcome::Superseded);
            }
            let term = term.trim();
            state.params.search = (!term.is_empty()).then(|| term.to_string());
            state.params.page = 1;
        }

        self.dispatch().await
    }

    fn update(&self, edit: impl FnOnce(&mut ListParams)) {
        edit(&mut lock(&self.state).params);
    }

    async fn dispatch(&self) -> Result<FetchOutcome, ClientError> {
        let (seq, query) = {
            let mut state = lock(&self.state);
            state.dispatched += 1;
            state.in_flight += 1;
            (state.dispatched, state.params.query_string())
        };
        let in_flight = InFlight { state: &self.state };

        let result = self.fetcher.fetch(&query).await;
        drop(in_flight);

        let mut state = lock(&self.state);
        if seq != state.dispatched {
            log::debug!(
                "Discarding response to request #{seq}, request #{} is newer",
                state.dispatched
            );
            return Ok(FetchOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                state.page = Some(page);
                state.last_error = None;
                Ok(FetchOutcome::Applied)
            }
            Err(err) => {
                state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
