//! Compact JSON rendering of papers for relevance prompts.

use serde_json::{Value, json};

use crate::models::{Paper, UNKNOWN_YEAR};

/// Create a compact paper representation for a prompt.
///
/// Empty fields are omitted to keep the prompt short.
#[must_use]
pub fn compact_paper(paper: &Paper) -> Value {
    let mut obj = json!({ "title": paper.title });

    if !paper.authors.is_empty() {
        obj["authors"] = json!(
            paper
                .authors
                .iter()
                .map(|a| format!("{} {}", a.first_name, a.last_name).trim().to_string())
                .collect::<Vec<_>>()
        );
    }

    if paper.year != UNKNOWN_YEAR {
        obj["year"] = json!(paper.year);
    }

    if !paper.venue.is_empty() {
        obj["venue"] = json!(paper.venue);
    }

    if !paper.summary.is_empty() {
        obj["summary"] = json!(paper.summary);
    }

    obj
}
