//! Client side of the list contract: keeping a table's query in sync with the
//! URL, fetching pages and rendering them.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

pub mod http;
pub mod query_sync;
pub mod table;

pub use http::HttpPageFetcher;
pub use query_sync::{FetchOutcome, ListParams, PageFetcher, QuerySync};
pub use table::{Column, RenderedTable, SortConfig, TableBody, TableView};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error body.
    #[error("server responded with {status}: {message}")]
    Status {
        status: u16,
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    #[error("malformed query string: {0}")]
    Query(String),
}

/// Error body sent by the server alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub message: String,
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}
