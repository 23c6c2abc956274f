//! Citation and reference reconciliation.
//!
//! A drafted survey is split on the first `## References` heading. A paper is
//! *cited* when one of its citation surface forms appears verbatim in the body
//! above that heading, and *listed* when an entry of the References section
//! is its reference entry or, failing that, carries its title.
//! Reconciliation makes the two sets equal, either by regenerating the
//! References section from the cited papers or by asking the model once to
//! cite what it missed and pruning what is still uncited.

mod validate;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{LlmResult, ReconcileError};
use crate::formatters::format_missing_citations;
use crate::llm::{ChatMessage, CompletionRequest, CompletionService};
use crate::models::{Paper, title_case};

pub use validate::{reference_entries, validate_survey, verify_bijection};

/// Heading that starts the References section.
pub const REFERENCES_HEADING: &str = "## References";

/// Generation budget for the repair round-trip.
const REPAIR_MAX_TOKENS: u32 = 10_000;

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank-run pattern"));

/// Split `text` at the first References heading into the body above it and
/// the section content below it.
///
/// # Errors
///
/// Returns [`ReconcileError::MissingReferencesMarker`] if the heading is absent.
pub fn split_references(text: &str) -> Result<(&str, &str), ReconcileError> {
    text.split_once(REFERENCES_HEADING).ok_or(ReconcileError::MissingReferencesMarker)
}

/// The part of `text` citations are looked for in: everything above the
/// References heading, or the whole text when there is none.
#[must_use]
pub fn citation_body(text: &str) -> &str {
    split_references(text).map_or(text, |(body, _)| body)
}

/// Whether `body` mentions `paper` as `Author (Year)` or inside a
/// parenthetical citation as `Author, Year`.
///
/// Matching is exact and case-sensitive.
#[must_use]
pub fn is_cited(paper: &Paper, body: &str) -> bool {
    let authors = paper.citation_authors();
    let year = paper.year_label();
    body.contains(&format!("{authors} ({year})")) || body.contains(&format!("{authors}, {year}"))
}

/// Papers cited in the body of `text`, in input order.
#[must_use]
pub fn cited_papers<'p>(text: &str, papers: &'p [Paper]) -> Vec<&'p Paper> {
    let body = citation_body(text);
    papers.iter().filter(|paper| is_cited(paper, body)).collect()
}

/// Papers not cited in the body of `text`, in input order.
#[must_use]
pub fn find_missing_citations(text: &str, papers: &[Paper]) -> Vec<Paper> {
    let body = citation_body(text);
    papers.iter().filter(|paper| !is_cited(paper, body)).cloned().collect()
}

/// Ask the model to revise `text` so it also cites `missing`.
///
/// The original drafting conversation is replayed with the draft as the
/// assistant turn, followed by a request for minimal edits. This is a single
/// round-trip; the caller decides what to do with papers still uncited.
///
/// # Errors
///
/// Returns an error if the completion fails.
pub async fn request_citation_repair(
    llm: &dyn CompletionService,
    text: &str,
    missing: &[Paper],
    system_prompt: &str,
    user_prompt: &str,
) -> LlmResult<String> {
    tracing::info!(missing = missing.len(), "Asking for missing citations to be added");

    let fix_prompt = format!(
        "The literature survey above does not cite the following papers, even though they \
         were provided as relevant:\n\n{}\n\nRevise the survey so that each of these papers is \
         cited at least once in the body, using exactly the citation forms given. Make minimal \
         edits, keep everything else unchanged, and make sure each paper is listed in the \
         References section. Return only the full Markdown of the revised survey.",
        format_missing_citations(missing)
    );

    let request = CompletionRequest::new(
        vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
            ChatMessage::assistant(text),
            ChatMessage::user(fix_prompt),
        ],
        0.0,
        REPAIR_MAX_TOKENS,
    );
    llm.complete(request).await
}

/// Remove References lines naming any of `uncited` by title.
///
/// A line is removed when it contains a paper's title as a whole-word match,
/// either verbatim or in title case. Blank-line runs left behind collapse to a
/// single blank line, and the section is reattached below the body.
///
/// # Errors
///
/// Returns [`ReconcileError::MissingReferencesMarker`] if the heading is absent.
pub fn prune_uncited(text: &str, uncited: &[Paper]) -> Result<String, ReconcileError> {
    let (body, references) = split_references(text)?;
    let matchers: Vec<Regex> = uncited.iter().filter_map(title_matcher).collect();

    let kept = references
        .lines()
        .map(str::trim_end)
        .filter(|line| !matchers.iter().any(|m| m.is_match(line)))
        .collect::<Vec<_>>()
        .join("\n");
    let kept = BLANK_RUNS.replace_all(kept.trim(), "\n\n");

    tracing::debug!(pruned = matchers.len(), "Pruned uncited references");
    Ok(assemble(body, &kept))
}

/// Replace the References section with canonical entries for exactly the
/// cited papers.
///
/// Entries are deduplicated and sorted by the first author's surname with a
/// stable sort, so equal surnames keep their input order. Papers without
/// authors sort first. Applying this twice gives the same text as applying it
/// once.
///
/// # Errors
///
/// Returns [`ReconcileError::MissingReferencesMarker`] if the heading is absent.
pub fn rebuild_references(text: &str, papers: &[Paper]) -> Result<String, ReconcileError> {
    let (body, _) = split_references(text)?;

    let mut seen = HashSet::new();
    let mut cited: Vec<&Paper> =
        papers.iter().filter(|paper| is_cited(paper, body) && seen.insert(*paper)).collect();
    cited.sort_by(|a, b| a.first_author_surname().cmp(b.first_author_surname()));

    let entries = cited.iter().map(|paper| paper.reference_entry()).collect::<Vec<_>>();

    tracing::debug!(cited = cited.len(), provided = papers.len(), "Rebuilt references");
    Ok(assemble(body, &entries.join("\n\n")))
}

/// Regex finding `paper`'s title as a whole word; `None` for an empty title.
pub(crate) fn title_matcher(paper: &Paper) -> Option<Regex> {
    let title = paper.title.trim();
    if title.is_empty() {
        return None;
    }

    let cased = title_case(title);
    let alternatives = if cased == title {
        regex::escape(title)
    } else {
        format!("{}|{}", regex::escape(title), regex::escape(&cased))
    };
    Regex::new(&format!(r"(?:^|\W)(?:{alternatives})(?:\W|$)")).ok()
}

fn assemble(body: &str, references: &str) -> String {
    let body = body.trim();
    if references.is_empty() {
        format!("{body}\n\n{REFERENCES_HEADING}\n")
    } else {
        format!("{body}\n\n{REFERENCES_HEADING}\n\n{references}")
    }
}
