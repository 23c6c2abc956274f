//! Error types for the survey pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! Errors are grouped by the collaborator that raises them so callers can tell
//! transient failures (retried locally) from contract violations (surfaced).

use std::path::PathBuf;
use std::time::Duration;

/// Errors from the paper index HTTP client.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the paper index (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Invalid request parameters (400 response other than an exhausted offset)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// Caller supplied parameters the index cannot accept
    #[error("Invalid search parameters: {0}")]
    InvalidInput(String),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub const fn rate_limited(retry_after: Duration) -> Self {
        Self::RateLimited { retry_after }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors from the completion service.
#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error (after transport retries)
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Non-success status from the completion endpoint
    #[error("Completion service returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The response carried no choices or no message content
    #[error("Completion service returned no content")]
    EmptyCompletion,

    /// The reply did not match the requested output schema
    #[error("Response does not match the '{schema}' schema: {source}")]
    InvalidStructuredResponse {
        /// Schema name that was requested
        schema: &'static str,
        /// Underlying decode error
        source: serde_json::Error,
    },

    /// Request serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from fetching and converting a paper's full text.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The link is not a fetchable http(s) URL
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl {
        /// Offending link
        url: String,
        /// Parse error message
        message: String,
    },

    /// Access denied (403); retrying is pointless
    #[error("Access forbidden: {url}")]
    Forbidden {
        /// Requested URL
        url: String,
    },

    /// Connection-level failure (connect, timeout, reset)
    #[error("Connection error for {url}: {message}")]
    Connection {
        /// Requested URL
        url: String,
        /// Underlying error message
        message: String,
    },

    /// Any other non-success HTTP status
    #[error("HTTP status {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The body was fetched but could not be turned into text
    #[error("Failed to convert {url} to text: {message}")]
    Conversion {
        /// Requested URL
        url: String,
        /// Conversion error message
        message: String,
    },
}

impl FetchError {
    /// Returns true if another attempt could plausibly succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Status { .. })
    }
}

/// Errors from reconciling a drafted survey against its bibliography.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ReconcileError {
    /// The draft has no `## References` heading to split on
    #[error("Survey has no '## References' section")]
    MissingReferencesMarker,
}

/// Rejections of a finished survey.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Body text is shorter than required
    #[error("Survey body has {words} words, at least {min} required")]
    TooShort {
        /// Word count found
        words: usize,
        /// Required minimum
        min: usize,
    },

    /// References section lists too few entries
    #[error("Survey lists {found} references, at least {min} required")]
    TooFewReferences {
        /// Entries found
        found: usize,
        /// Required minimum
        min: usize,
    },

    /// A required heading is absent
    #[error("Survey is missing the '{0}' section")]
    MissingSection(String),

    /// A paper is cited in the body but not listed
    #[error("'{0}' is cited in the body but missing from References")]
    UnlistedCitation(String),

    /// A paper is listed but never cited
    #[error("'{0}' is listed in References but never cited")]
    UncitedReference(String),
}

/// Errors from the Markdown to PDF renderer.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// One or more external tools are not installed
    #[error("Cannot render PDF, missing tools: {missing}. Install them and run `{command}`")]
    ToolMissing {
        /// Comma-separated list of missing binaries
        missing: String,
        /// Command to run manually once installed
        command: String,
    },

    /// The renderer exited with a failure
    #[error("Renderer failed ({status}). Run `{command}` manually to inspect the error")]
    Failed {
        /// Exit status description
        status: String,
        /// Command to run manually
        command: String,
    },

    /// I/O error talking to the child process or the file system
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the end-to-end survey pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SurveyError {
    /// Paper index failure
    #[error("Paper index error: {0}")]
    Client(#[from] ClientError),

    /// Completion service failure
    #[error("Completion service error: {0}")]
    Llm(#[from] LlmError),

    /// Reconciliation contract violation
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Final artifact rejected
    #[error("Survey rejected: {0}")]
    Validation(#[from] ValidationError),

    /// The planner produced no usable queries
    #[error("No search queries remain after normalisation for topic '{0}'")]
    NoQueries(String),

    /// Persisted artifact path violates its constraints
    #[error("Invalid artifact path {path:?}: {reason}")]
    InvalidArtifactPath {
        /// Offending path
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// File system error while persisting artifacts
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SurveyError {
    /// Convert to an actionable message for the command line.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Llm(LlmError::InvalidStructuredResponse { schema, .. }) => format!(
                "The model did not return a valid '{schema}' response. \
                 Try again or use a model with structured output support."
            ),
            Self::Validation(err) => {
                format!("The generated survey was rejected: {err}. Re-run to draft it again.")
            }
            Self::Reconcile(ReconcileError::MissingReferencesMarker) => {
                "The model omitted the '## References' heading. Re-run to draft it again."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for completion service operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// Result type alias for pipeline operations.
pub type SurveyResult<T> = Result<T, SurveyError>;
