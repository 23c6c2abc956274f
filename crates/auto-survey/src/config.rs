//! Configuration for the paper index, the completion service and the survey pipeline.

use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Graph API endpoint.
    pub const GRAPH_API: &str = "https://api.semanticscholar.org/graph/v1";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Pacing delay between requests without API key (1 req/s shared pool).
    pub const RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

    /// Pacing delay between requests with API key.
    pub const RATE_LIMIT_DELAY_WITH_KEY: Duration = Duration::from_millis(100);

    /// Retries for connection-level failures.
    pub const MAX_RETRIES: u32 = 3;

    /// Fixed wait after a 429 before asking again.
    pub const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(10);

    /// Cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cache size.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Browser-like User-Agent; some hosts refuse obvious bots.
    pub const USER_AGENT: &str =
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:143.0) Gecko/20100101 Firefox/143.0";

    /// Body fragment the index returns when an offset is past the last page.
    pub const EXHAUSTED_MARKER: &str = "this limit and/or offset is not available";
}

/// Paper field sets for API requests.
pub mod fields {
    /// Fields needed to build a [`crate::models::Paper`].
    pub const SEARCH: &[&str] =
        &["title", "authors", "year", "publicationVenue", "openAccessPdf", "abstract"];
}

/// Completion service defaults.
pub mod llm {
    use std::time::Duration;

    /// Default model ID.
    pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

    /// Default OpenAI-compatible endpoint.
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

    /// Environment variable holding the API key by default.
    pub const DEFAULT_API_KEY_ENV_VAR: &str = "INFERENCE_SERVER_API_KEY";

    /// Generation can be slow for the long survey draft.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

    /// Transport-level retries for the completion endpoint.
    pub const MAX_RETRIES: u32 = 3;
}

/// Paper index configuration.
#[derive(Clone)]
pub struct Config {
    /// Semantic Scholar API key (optional).
    pub api_key: Option<String>,

    /// Base URL for Graph API (for testing with mock servers).
    pub graph_api_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Delay before every request.
    pub rate_limit_delay: Duration,

    /// Delay after a 429 before retrying.
    pub rate_limit_backoff: Duration,

    /// Retries for connection-level failures; HTTP statuses are never retried
    /// by the transport.
    pub max_retries: u32,

    /// Cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,
}

impl Config {
    /// Create a new configuration with optional API key.
    ///
    /// The pacing delay is shorter when a key is present.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        let rate_limit_delay = if api_key.is_some() {
            api::RATE_LIMIT_DELAY_WITH_KEY
        } else {
            api::RATE_LIMIT_DELAY
        };
        Self {
            api_key,
            graph_api_url: api::GRAPH_API.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            rate_limit_delay,
            rate_limit_backoff: api::RATE_LIMIT_BACKOFF,
            max_retries: api::MAX_RETRIES,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
        }
    }

    /// Create a test configuration with custom URLs for mock servers.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_key: None,
            graph_api_url: format!("{base_url}/graph/v1"),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            rate_limit_delay: Duration::ZERO,
            rate_limit_backoff: Duration::from_millis(10),
            max_retries: 2,
            cache_ttl: Duration::ZERO,
            cache_max_size: 0,
        }
    }

    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok().filter(|k| !k.is_empty());
        Self::new(api_key)
    }

    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("has_api_key", &self.has_api_key())
            .field("graph_api_url", &self.graph_api_url)
            .field("rate_limit_delay", &self.rate_limit_delay)
            .field("rate_limit_backoff", &self.rate_limit_backoff)
            .finish()
    }
}

/// Completion service configuration.
#[derive(Clone)]
pub struct LlmConfig {
    /// Model ID sent with every request.
    pub model: String,

    /// OpenAI-compatible API base URL.
    pub base_url: String,

    /// Bearer token, if the server needs one.
    pub api_key: Option<String>,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Transport retries for connection failures and 5xx.
    pub max_retries: u32,
}

impl LlmConfig {
    /// Create a configuration for the given model and endpoint.
    #[must_use]
    pub fn new(
        model: impl Into<String>,
        base_url: Option<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            model: model.into(),
            base_url: base_url.unwrap_or_else(|| llm::DEFAULT_BASE_URL.to_string()),
            api_key,
            request_timeout: llm::REQUEST_TIMEOUT,
            max_retries: llm::MAX_RETRIES,
        }
    }

    /// Read the API key from the named environment variable.
    #[must_use]
    pub fn with_api_key_from_env(mut self, var: &str) -> Self {
        self.api_key = std::env::var(var).ok().filter(|k| !k.is_empty());
        self
    }

    /// Create a test configuration pointed at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            model: "test-model".to_string(),
            base_url: format!("{base_url}/v1"),
            api_key: Some("test-key".to_string()),
            request_timeout: Duration::from_secs(5),
            max_retries: 0,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::new(llm::DEFAULT_MODEL, None, None)
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

/// How the writer makes the References section agree with the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcileStrategy {
    /// Discard the model's references and regenerate them for cited papers.
    #[default]
    Rebuild,
    /// Ask the model once to cite what it missed, then prune what is still uncited.
    RepairAndPrune,
}

/// Acceptance rules for a finished survey.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    /// Minimum number of words above the References heading.
    pub min_words: usize,

    /// Minimum number of reference entries.
    pub min_references: usize,

    /// Headings (without `#`) that must appear, matched case-insensitively.
    pub required_sections: Vec<String>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_words: 300,
            min_references: 1,
            required_sections: vec!["Introduction".to_string(), "Conclusion".to_string()],
        }
    }
}

impl ValidationRules {
    /// Rules that accept any survey with a References section.
    #[must_use]
    pub fn permissive() -> Self {
        Self { min_words: 0, min_references: 0, required_sections: Vec::new() }
    }
}

/// Survey pipeline settings.
#[derive(Debug, Clone)]
pub struct SurveySettings {
    /// Number of relevant papers to collect.
    pub num_papers: usize,

    /// Number of search queries to ask the planner for.
    pub num_queries: usize,

    /// Page size for each search request.
    pub batch_size: usize,

    /// Upper bound on full sweeps over the active queries.
    pub max_sweeps: usize,

    /// Papers summarised concurrently.
    pub summarize_concurrency: usize,

    /// Attempts to fetch a paper's full text.
    pub fetch_attempts: usize,

    /// Delay between fetch attempts.
    pub fetch_retry_delay: Duration,

    /// Characters of full text kept before the middle is dropped.
    pub max_content_chars: usize,

    /// Reference reconciliation strategy.
    pub reconcile_strategy: ReconcileStrategy,

    /// Acceptance rules for the final Markdown.
    pub validation: ValidationRules,
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            num_papers: 50,
            num_queries: 10,
            batch_size: 5,
            max_sweeps: 100,
            summarize_concurrency: 4,
            fetch_attempts: 3,
            fetch_retry_delay: Duration::from_secs(1),
            max_content_chars: 150_000,
            reconcile_strategy: ReconcileStrategy::Rebuild,
            validation: ValidationRules::default(),
        }
    }
}
