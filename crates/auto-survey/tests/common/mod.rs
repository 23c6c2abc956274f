//! In-process fakes for the pipeline's collaborators.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use serde_json::json;

use auto_survey::client::{PaperIndex, SearchPage};
use auto_survey::error::{ClientError, ClientResult, FetchError, LlmResult};
use auto_survey::llm::{CompletionRequest, CompletionService};
use auto_survey::models::{Author, Paper};
use auto_survey::summarize::DocumentFetcher;

/// Build a paper from `(first, last)` author pairs.
pub fn paper(title: &str, authors: &[(&str, &str)], year: i32, venue: &str) -> Paper {
    Paper {
        title: title.to_string(),
        authors: authors.iter().map(|(first, last)| Author::new(*first, *last)).collect(),
        year,
        venue: venue.to_string(),
        url: String::new(),
        summary: format!("Abstract of {title}."),
    }
}

type Writer = Box<dyn Fn(&CompletionRequest) -> String + Send + Sync>;

/// Completion service answering each schema from a script.
///
/// Queries and summaries are fixed, a paper is judged irrelevant when its
/// title is in `irrelevant`, and free-text requests go to `writer`.
pub struct ScriptedLlm {
    pub queries: Vec<String>,
    pub irrelevant: Vec<String>,
    pub summary: String,
    writer: Writer,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn new(queries: &[&str]) -> Self {
        Self {
            queries: queries.iter().map(ToString::to_string).collect(),
            irrelevant: Vec::new(),
            summary: "A focused summary.".to_string(),
            writer: Box::new(|_| String::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_irrelevant(mut self, titles: &[&str]) -> Self {
        self.irrelevant = titles.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    pub fn with_writer(
        mut self,
        writer: impl Fn(&CompletionRequest) -> String + Send + Sync + 'static,
    ) -> Self {
        self.writer = Box::new(writer);
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests constrained to `schema`; `None` counts free-text requests.
    pub fn calls(&self, schema: Option<&str>) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.response_schema.as_ref().map(|s| s.name) == schema)
            .count()
    }
}

#[async_trait::async_trait]
impl CompletionService for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String> {
        let reply = match request.response_schema.as_ref().map(|s| s.name) {
            Some("queries") => json!({ "queries": self.queries }).to_string(),
            Some("is_relevant") => {
                let prompt = request.last_user_message().unwrap_or_default();
                let relevant = !self.irrelevant.iter().any(|title| prompt.contains(title.as_str()));
                json!({ "is_relevant": relevant }).to_string()
            }
            Some("summary") => json!({ "summary": self.summary }).to_string(),
            _ => (self.writer)(&request),
        };
        self.requests.lock().unwrap().push(request);
        Ok(reply)
    }
}

/// Completion service that always gives the same reply.
pub struct FixedReply(pub String);

#[async_trait::async_trait]
impl CompletionService for FixedReply {
    async fn complete(&self, _request: CompletionRequest) -> LlmResult<String> {
        Ok(self.0.clone())
    }
}

/// Paper index serving fixed result lists per query.
#[derive(Default)]
pub struct FakeIndex {
    results: HashMap<String, Vec<Paper>>,
    empty_pages: HashSet<(String, usize)>,
    failing: Vec<String>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: &str, papers: Vec<Paper>) -> Self {
        self.results.insert(query.to_string(), papers);
        self
    }

    /// Make `query` answer with an empty, non-final page at `offset`.
    pub fn with_empty_page(mut self, query: &str, offset: usize) -> Self {
        self.empty_pages.insert((query.to_string(), offset));
        self
    }

    /// Make `query` answer with a server error.
    pub fn with_failing_query(mut self, query: &str) -> Self {
        self.failing.push(query.to_string());
        self
    }

    /// `(query, offset)` of every search, in order.
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PaperIndex for FakeIndex {
    async fn search(&self, query: &str, limit: usize, offset: usize) -> ClientResult<SearchPage> {
        self.calls.lock().unwrap().push((query.to_string(), offset));

        if self.failing.iter().any(|q| q == query) {
            return Err(ClientError::server(500, "index unavailable"));
        }

        if self.empty_pages.contains(&(query.to_string(), offset)) {
            return Ok(SearchPage::Papers(Vec::new()));
        }

        let papers = self.results.get(query).map(Vec::as_slice).unwrap_or_default();
        if offset >= papers.len() {
            return Ok(SearchPage::Exhausted);
        }
        let end = (offset + limit).min(papers.len());
        Ok(SearchPage::Papers(papers[offset..end].to_vec()))
    }
}

/// What a [`FakeFetcher`] does for a URL.
#[derive(Clone)]
pub enum FetchOutcome {
    Text(String),
    Forbidden,
    ConnectionError,
    Unconvertible,
}

/// Document fetcher with scripted outcomes per URL.
#[derive(Default)]
pub struct FakeFetcher {
    outcomes: HashMap<String, FetchOutcome>,
    attempts: Mutex<HashMap<String, usize>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, outcome: FetchOutcome) -> Self {
        self.outcomes.insert(url.to_string(), outcome);
        self
    }

    pub fn attempts(&self, url: &str) -> usize {
        self.attempts.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl DocumentFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        *self.attempts.lock().unwrap().entry(url.to_string()).or_default() += 1;

        match self.outcomes.get(url) {
            Some(FetchOutcome::Text(text)) => Ok(text.clone()),
            Some(FetchOutcome::Forbidden) => Err(FetchError::Forbidden { url: url.to_string() }),
            Some(FetchOutcome::Unconvertible) => Err(FetchError::Conversion {
                url: url.to_string(),
                message: "not a document".to_string(),
            }),
            Some(FetchOutcome::ConnectionError) | None => Err(FetchError::Connection {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}
