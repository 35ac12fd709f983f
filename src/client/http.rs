//! [`PageFetcher`] backed by the `/api/v1` list endpoints.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::client::query_sync::PageFetcher;
use crate::client::{ClientError, ErrorPayload};
use crate::pagination::Page;

/// Fetches pages of one resource, e.g. `payments`.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    base_url: String,
    resource: String,
    token: Option<String>,
}

impl HttpPageFetcher {
    pub fn new(base_url: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            resource: resource.into(),
            token: None,
        }
    }

    /// Sends the JWT as a bearer token with every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url_for(&self, query: &str) -> String {
        if query.is_empty() {
            format!("{}/api/v1/{}", self.base_url, self.resource)
        } else {
            format!("{}/api/v1/{}?{query}", self.base_url, self.resource)
        }
    }
}

#[async_trait]
impl<T> PageFetcher<T> for HttpPageFetcher
where
    T: DeserializeOwned + Send,
{
    async fn fetch(&self, query: &str) -> Result<Page<T>, ClientError> {
        let mut request = self.client.get(self.url_for(query));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Page<T>>().await?);
        }

        let payload = response.json::<ErrorPayload>().await.unwrap_or_else(|err| {
            log::debug!("Unreadable error body for {status}: {err}");
            ErrorPayload {
                message: status.canonical_reason().unwrap_or("request failed").to_string(),
                errors: Default::default(),
            }
        });
        Err(ClientError::Status {
            status: status.as_u16(),
            message: payload.message,
            errors: payload.errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_includes_resource_and_query() {
        let fetcher = HttpPageFetcher::new("http://localhost:8080/", "payments");

        assert_eq!(
            fetcher.url_for("page=2&perPage=5"),
            "http://localhost:8080/api/v1/payments?page=2&perPage=5"
        );
        assert_eq!(fetcher.url_for(""), "http://localhost:8080/api/v1/payments");
    }
}
