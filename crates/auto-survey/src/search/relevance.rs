//! Relevance judgement.

use crate::formatters::compact_paper;
use crate::llm::{ChatMessage, CompletionService, complete_structured};
use crate::error::LlmResult;
use crate::models::{IsRelevant, Paper};

const SYSTEM_PROMPT: &str = "You are an expert academic researcher. Your task is to determine \
whether a given academic paper is relevant to a specified topic. If it is not directly relevant \
to the topic, but is related to a closely related topic, consider it relevant.\n\nYou will be \
provided with the title and summary of the paper, as well as the topic. Your response should be \
a JSON object with a single key 'is_relevant' mapping to a boolean value: true if the paper is \
relevant to the topic, false otherwise.";

/// Ask the completion service whether `paper` is relevant to `topic`.
///
/// Runs at temperature zero so the same paper, topic and model always get the
/// same verdict.
///
/// # Errors
///
/// Returns an error if the completion fails or the reply is not a boolean verdict.
pub async fn is_relevant(
    llm: &dyn CompletionService,
    paper: &Paper,
    topic: &str,
) -> LlmResult<bool> {
    let user_prompt = format!(
        "Determine if the following paper is relevant to the topic {topic:?}. Return your answer \
         as a JSON object with a single key 'is_relevant' mapping to a boolean value.\n\n\
         <paper>\n{}\n</paper>",
        compact_paper(paper)
    );

    let verdict: IsRelevant = complete_structured(
        llm,
        vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)],
        0.0,
        32,
    )
    .await?;

    tracing::debug!(title = %paper.title, relevant = verdict.is_relevant, "Judged paper");
    Ok(verdict.is_relevant)
}

/// Keep the papers judged relevant, in their original order.
///
/// # Errors
///
/// Returns the first judgement error.
pub async fn filter_relevant(
    llm: &dyn CompletionService,
    papers: Vec<Paper>,
    topic: &str,
) -> LlmResult<Vec<Paper>> {
    let mut kept = Vec::with_capacity(papers.len());
    for paper in papers {
        if is_relevant(llm, &paper, topic).await? {
            kept.push(paper);
        }
    }
    Ok(kept)
}
