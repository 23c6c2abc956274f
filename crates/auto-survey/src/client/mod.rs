//! Semantic Scholar paper index client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Request pacing and fixed-backoff retry on 429
//! - Distinguished "offset exhausted" pages
//! - Response caching keyed by request

use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::{
    RetryTransientMiddleware, Retryable, RetryableStrategy, default_on_request_failure,
};

use crate::config::{Config, api, fields};
use crate::error::{ClientError, ClientResult};
use crate::models::{Paper, SearchResponse};

/// Result of asking the index for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPage {
    /// Papers on this page; may be empty without meaning the query is done.
    Papers(Vec<Paper>),
    /// The requested offset is past the last page for this query.
    Exhausted,
}

impl SearchPage {
    /// Papers on this page, empty when exhausted.
    #[must_use]
    pub fn into_papers(self) -> Vec<Paper> {
        match self {
            Self::Papers(papers) => papers,
            Self::Exhausted => Vec::new(),
        }
    }

    /// Whether the query has no further pages.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

/// A paginated source of candidate papers.
#[async_trait::async_trait]
pub trait PaperIndex: Send + Sync {
    /// Fetch up to `limit` papers for `query`, starting at `offset`.
    async fn search(&self, query: &str, limit: usize, offset: usize) -> ClientResult<SearchPage>;
}

/// Semantic Scholar API client.
#[derive(Clone)]
pub struct SemanticScholarClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Response cache.
    cache: Cache<String, serde_json::Value>,

    /// API key (optional).
    api_key: Option<String>,

    /// Graph API base URL.
    graph_api_url: String,

    /// Delay before every request.
    rate_limit_delay: Duration,

    /// Delay after a 429 response.
    rate_limit_backoff: Duration,
}

/// Retry policy for the index transport: connection failures are retried,
/// every HTTP status is left to [`SemanticScholarClient::search_papers`].
struct TransportFailuresOnly;

impl RetryableStrategy for TransportFailuresOnly {
    fn handle(
        &self,
        res: &Result<reqwest::Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match res {
            Ok(_) => None,
            Err(error) => default_on_request_failure(error),
        }
    }
}

impl SemanticScholarClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(ref key) = config.api_key {
            headers.insert("x-api-key", key.parse()?);
        }

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(api::USER_AGENT)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(config.max_retries);

        // 429s are retried by `search_papers` itself with a fixed delay.
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy_and_strategy(
                retry_policy,
                TransportFailuresOnly,
            ))
            .build();

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            client,
            cache,
            api_key: config.api_key,
            graph_api_url: config.graph_api_url,
            rate_limit_delay: config.rate_limit_delay,
            rate_limit_backoff: config.rate_limit_backoff,
        })
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search for papers.
    ///
    /// Rate-limited requests are retried after a fixed backoff for as long as
    /// the index keeps answering 429. An out-of-range offset yields
    /// [`SearchPage::Exhausted`]; any other failure status is returned as an error.
    ///
    /// # Errors
    ///
    /// Returns error on invalid input, transport failure or a non-success status.
    pub async fn search_papers(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> ClientResult<SearchPage> {
        if limit == 0 {
            return Err(ClientError::InvalidInput("limit must be greater than zero".to_string()));
        }

        let url = format!("{}/paper/search", self.graph_api_url);
        let params = vec![
            ("query".to_string(), query.to_string()),
            ("fields".to_string(), fields::SEARCH.join(",")),
            ("limit".to_string(), limit.to_string()),
            ("offset".to_string(), offset.to_string()),
        ];

        let cache_key = self.cache_key("GET", &url, &params);
        if let Some(cached) = self.cache.get(&cache_key).await {
            return Self::parse_page(cached);
        }

        loop {
            tokio::time::sleep(self.rate_limit_delay).await;

            let response = self.client.get(&url).query(&params).send().await?;

            match self.handle_response(response).await {
                Ok(response) => {
                    let value: serde_json::Value = response.json().await?;
                    self.cache.insert(cache_key, value.clone()).await;
                    return Self::parse_page(value);
                }
                Err(ClientError::RateLimited { .. }) => {
                    tracing::debug!(
                        query,
                        backoff = ?self.rate_limit_backoff,
                        "Rate limited by Semantic Scholar, waiting before retrying"
                    );
                    tokio::time::sleep(self.rate_limit_backoff).await;
                }
                Err(ClientError::BadRequest { message })
                    if message.to_lowercase().contains(api::EXHAUSTED_MARKER) =>
                {
                    tracing::debug!(query, offset, "Query exhausted");
                    return Ok(SearchPage::Exhausted);
                }
                Err(e) => {
                    tracing::error!(query, offset, error = %e, "Paper search failed");
                    return Err(e);
                }
            }
        }
    }

    fn parse_page(value: serde_json::Value) -> ClientResult<SearchPage> {
        if value.is_null() {
            return Ok(SearchPage::Papers(Vec::new()));
        }
        let response: SearchResponse = serde_json::from_value(value)?;
        Ok(SearchPage::Papers(
            response.into_records().into_iter().map(Paper::from_record).collect(),
        ))
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => Err(ClientError::rate_limited(self.rate_limit_backoff)),
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }

    /// Generate cache key.
    fn cache_key(&self, method: &str, url: &str, params: &[(String, String)]) -> String {
        use md5::{Digest, Md5};

        let mut hasher = Md5::new();
        hasher.update(method.as_bytes());
        hasher.update(b"|");
        hasher.update(url.as_bytes());
        hasher.update(b"|");

        for (k, v) in params {
            hasher.update(k.as_bytes());
            hasher.update(b"=");
            hasher.update(v.as_bytes());
            hasher.update(b"&");
        }

        format!("{:x}", hasher.finalize())
    }
}

#[async_trait::async_trait]
impl PaperIndex for SemanticScholarClient {
    async fn search(&self, query: &str, limit: usize, offset: usize) -> ClientResult<SearchPage> {
        self.search_papers(query, limit, offset).await
    }
}

impl std::fmt::Debug for SemanticScholarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticScholarClient").field("has_api_key", &self.has_api_key()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_null_body() {
        let page = SemanticScholarClient::parse_page(serde_json::Value::Null).unwrap();
        assert_eq!(page, SearchPage::Papers(Vec::new()));
    }

    #[test]
    fn test_parse_page_converts_records() {
        let value = serde_json::json!({
            "data": [{"title": "A", "authors": [{"name": "Jane Doe"}], "year": 2021}]
        });
        let papers = SemanticScholarClient::parse_page(value).unwrap().into_papers();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].narrative_citation(), "Doe (2021)");
    }

    #[test]
    fn test_exhausted_page_has_no_papers() {
        assert!(SearchPage::Exhausted.is_exhausted());
        assert!(SearchPage::Exhausted.into_papers().is_empty());
    }
}
