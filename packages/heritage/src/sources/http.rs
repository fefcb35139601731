//! HTTP site source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::traits::source::SiteSource;

/// Default request timeout for the dataset fetch.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

/// Fetches the site payload from a URL.
///
/// Without a query this is a plain `GET` with `Accept: application/json`.
/// With a query the source `POST`s `{ "query": ... }` instead, which is how
/// a SPARQL-style proxy endpoint is driven.
///
/// # Example
///
/// ```rust,ignore
/// use heritage::sources::HttpSiteSource;
///
/// let source = HttpSiteSource::new("https://example.org/sites.json")?;
/// let payload = source.fetch().await?;
/// ```
pub struct HttpSiteSource {
    client: reqwest::Client,
    url: Url,
    query: Option<String>,
}

impl HttpSiteSource {
    /// Create a source with the default timeout.
    pub fn new(url: &str) -> SourceResult<Self> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> SourceResult<Self> {
        let parsed = Url::parse(url).map_err(|_| SourceError::InvalidUrl {
            url: url.to_string(),
        })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: parsed,
            query: None,
        })
    }

    /// Send `query` in a JSON body instead of issuing a plain GET.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

#[async_trait]
impl SiteSource for HttpSiteSource {
    async fn fetch(&self) -> SourceResult<Value> {
        let request = match &self.query {
            Some(query) => self
                .client
                .post(self.url.clone())
                .json(&QueryBody { query }),
            None => self.client.get(self.url.clone()),
        };

        debug!(url = %self.url, post = self.query.is_some(), "fetching site payload");
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "site payload request failed");
                SourceError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        let payload: Value = response.json().await?;
        Ok(payload)
    }

    fn name(&self) -> &str {
        "http"
    }
}
