//! Search query planning.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SurveyError, SurveyResult};
use crate::llm::{ChatMessage, CompletionService, complete_structured};
use crate::models::Queries;

static OR_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i) OR ").expect("valid OR separator pattern"));

const SYSTEM_PROMPT: &str = "You are an expert academic researcher. Your task is to generate a \
list of concise search queries that can be used to find academic papers related to a given \
topic. The queries should be specific enough to yield relevant results, but not so specific \
that they miss important papers. Each query should be a single line of text. Do not use 'OR' \
or 'AND' statements in the queries.";

/// Ask the completion service for search queries on `topic`.
///
/// The reply is normalised with [`normalize_queries`], so the result may hold
/// fewer than `target_count` queries but is never empty.
///
/// # Errors
///
/// Returns an error if the completion fails, the reply is not a query list, or
/// nothing usable remains after normalisation.
pub async fn plan_queries(
    llm: &dyn CompletionService,
    topic: &str,
    target_count: usize,
) -> SurveyResult<Vec<String>> {
    tracing::info!(topic, target_count, "Generating search queries");

    let user_prompt = format!(
        "Generate a list of exactly {target_count} concise search queries to find academic \
         papers related to the following topic: {topic:?}. Return the queries as a JSON object \
         with a single key 'queries' mapping to a list of strings."
    );

    let response: Queries = complete_structured(
        llm,
        vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)],
        0.5,
        256,
    )
    .await?;

    let queries = normalize_queries(response.queries);
    if queries.is_empty() {
        return Err(SurveyError::NoQueries(topic.to_string()));
    }

    tracing::info!(count = queries.len(), queries = ?queries, "Generated search queries");
    Ok(queries)
}

/// Clean up raw queries for the paper index.
///
/// Blank entries are dropped, `" OR "` (any case) splits a query into
/// independent ones, `" AND "` is removed as an implicit conjunction, and
/// duplicates are dropped keeping the first occurrence.
#[must_use]
pub fn normalize_queries<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut queries: Vec<String> = Vec::new();

    for query in raw {
        for part in OR_SEPARATOR.split(query.as_ref().trim()) {
            let cleaned = part.replace(" AND ", " ");
            let cleaned = cleaned.trim();
            if !cleaned.is_empty() && !queries.iter().any(|q| q == cleaned) {
                queries.push(cleaned.to_string());
            }
        }
    }

    queries
}
