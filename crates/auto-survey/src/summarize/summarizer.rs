//! Topic-focused paper summaries.

use std::borrow::Cow;
use std::time::Duration;

use futures::{StreamExt, TryStreamExt};

use super::fetch::DocumentFetcher;
use crate::config::SurveySettings;
use crate::error::{LlmError, LlmResult};
use crate::llm::{ChatMessage, CompletionService, complete_structured};
use crate::models::{Paper, Summary};

/// Inserted where the middle of an over-long document was dropped.
pub const TRUNCATION_MARKER: &str = "\n\n(...content truncated...)\n\n";

const SYSTEM_PROMPT: &str = "You are an expert research assistant. Your task is to read and \
summarise research papers. The summary should focus on the provided topic, highlighting the most \
relevant points from the paper. The summary should be concise and informative.";

/// Knobs for full-text retrieval.
#[derive(Debug, Clone, Copy)]
pub struct SummarizeOptions {
    /// Fetch attempts per paper.
    pub fetch_attempts: usize,
    /// Delay between failed attempts.
    pub retry_delay: Duration,
    /// Characters kept before the middle of a document is dropped.
    pub max_content_chars: usize,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self::from(&SurveySettings::default())
    }
}

impl From<&SurveySettings> for SummarizeOptions {
    fn from(settings: &SurveySettings) -> Self {
        Self {
            fetch_attempts: settings.fetch_attempts,
            retry_delay: settings.fetch_retry_delay,
            max_content_chars: settings.max_content_chars,
        }
    }
}

/// Summarises papers with respect to a topic, reading the full text when it
/// can be fetched.
pub struct PaperSummarizer<'a> {
    llm: &'a dyn CompletionService,
    fetcher: &'a dyn DocumentFetcher,
    options: SummarizeOptions,
}

impl<'a> PaperSummarizer<'a> {
    /// Create a summariser.
    #[must_use]
    pub fn new(
        llm: &'a dyn CompletionService,
        fetcher: &'a dyn DocumentFetcher,
        options: SummarizeOptions,
    ) -> Self {
        Self { llm, fetcher, options }
    }

    /// Produce a summary of `paper` focused on `topic`.
    ///
    /// Fetch failures never fail the call: the paper's title and existing
    /// summary are used instead of the full text.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion fails, does not match the summary
    /// schema, or yields an empty summary.
    pub async fn summarize(&self, paper: &Paper, topic: &str) -> LlmResult<String> {
        let content = match self.fetch_content(&paper.url).await {
            Some(text) => truncate_middle(&text, self.options.max_content_chars).into_owned(),
            None => fallback_document(paper),
        };

        let user_prompt = format!(
            "Summarise the following paper, focusing on the topic {topic:?}. The summary should \
             be concise and informative, highlighting the most relevant points from the paper.\n\n\
             <paper>\n{content}\n</paper>\n\n\
             You should return a JSON dictionary with a single key 'summary' mapping to the \
             summary string."
        );

        let reply: Summary = complete_structured(
            self.llm,
            vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)],
            0.0,
            1024,
        )
        .await?;

        let summary = reply.summary.trim();
        if summary.is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        Ok(summary.to_string())
    }

    /// Replace the summary of every paper, keeping the input order.
    ///
    /// Up to `concurrency` papers are processed at once.
    ///
    /// # Errors
    ///
    /// Returns the first summarisation error.
    pub async fn summarize_all(
        &self,
        papers: Vec<Paper>,
        topic: &str,
        concurrency: usize,
    ) -> LlmResult<Vec<Paper>> {
        tracing::info!(count = papers.len(), "Summarising papers");

        futures::stream::iter(papers)
            .map(|mut paper| async move {
                paper.summary = self.summarize(&paper, topic).await?;
                tracing::debug!(title = %paper.title, "Summarised paper");
                Ok::<_, LlmError>(paper)
            })
            .buffered(concurrency.max(1))
            .try_collect()
            .await
    }

    async fn fetch_content(&self, url: &str) -> Option<String> {
        if url.is_empty() {
            return None;
        }

        for attempt in 1..=self.options.fetch_attempts {
            match self.fetcher.fetch_text(url).await {
                Ok(text) => return Some(text),
                Err(e) if e.is_retryable() => {
                    tracing::debug!(url, attempt, error = %e, "Full text fetch failed, retrying");
                    if attempt < self.options.fetch_attempts {
                        tokio::time::sleep(self.options.retry_delay).await;
                    }
                }
                Err(e) => {
                    tracing::debug!(url, error = %e, "Full text unavailable");
                    return None;
                }
            }
        }

        tracing::debug!(url, attempts = self.options.fetch_attempts, "Giving up on full text");
        None
    }
}

/// Keep the first and last `max_chars / 2` characters of `content`, joined by
/// [`TRUNCATION_MARKER`]. Content within the limit is returned unchanged.
#[must_use]
pub fn truncate_middle(content: &str, max_chars: usize) -> Cow<'_, str> {
    let total = content.chars().count();
    if total <= max_chars {
        return Cow::Borrowed(content);
    }

    let half = max_chars / 2;
    let head_end = content.char_indices().nth(half).map_or(content.len(), |(i, _)| i);
    let tail_start = content.char_indices().nth(total - half).map_or(content.len(), |(i, _)| i);

    Cow::Owned(format!("{}{TRUNCATION_MARKER}{}", &content[..head_end], &content[tail_start..]))
}

/// Stand-in document built from the paper's metadata.
#[must_use]
pub fn fallback_document(paper: &Paper) -> String {
    let mut document = format!("# {}", paper.title);
    if !paper.summary.is_empty() {
        document.push_str("\n\n## Summary\n\n");
        document.push_str(&paper.summary);
    }
    document
}
