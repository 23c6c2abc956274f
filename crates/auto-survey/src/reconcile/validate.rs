//! Acceptance checks for a finished survey.

use std::collections::HashSet;

use regex::Regex;

use super::{REFERENCES_HEADING, is_cited, split_references, title_matcher};
use crate::config::ValidationRules;
use crate::error::ValidationError;
use crate::models::Paper;

/// Non-empty entries of a References section, split on blank lines.
#[must_use]
pub fn reference_entries(references: &str) -> Vec<&str> {
    references.split("\n\n").map(str::trim).filter(|entry| !entry.is_empty()).collect()
}

/// Check that every paper is listed in References exactly when it is cited
/// in the body.
///
/// # Errors
///
/// Returns the first paper that is cited but not listed, or listed but not
/// cited. A text without a References heading lists nothing.
pub fn verify_bijection(text: &str, papers: &[Paper]) -> Result<(), ValidationError> {
    let (body, references) = split_references(text).unwrap_or((text, ""));
    let listed = listed_papers(&reference_entries(references), papers);

    for (index, paper) in papers.iter().enumerate() {
        match (is_cited(paper, body), listed.contains(&index)) {
            (true, false) => return Err(ValidationError::UnlistedCitation(paper.title.clone())),
            (false, true) => return Err(ValidationError::UncitedReference(paper.title.clone())),
            _ => {}
        }
    }
    Ok(())
}

/// Indices of the papers that `entries` list.
///
/// An entry equal to a paper's canonical reference entry lists that paper.
/// Any other entry lists the paper with the longest title it contains, so a
/// title nested in a longer one is not counted twice.
fn listed_papers(entries: &[&str], papers: &[Paper]) -> HashSet<usize> {
    let canonical: Vec<String> = papers.iter().map(Paper::reference_entry).collect();
    let matchers: Vec<Option<Regex>> = papers.iter().map(title_matcher).collect();
    let mut listed = HashSet::new();

    for entry in entries {
        let exact: Vec<usize> = canonical
            .iter()
            .enumerate()
            .filter(|(_, reference)| reference.as_str() == *entry)
            .map(|(index, _)| index)
            .collect();
        if !exact.is_empty() {
            listed.extend(exact);
            continue;
        }

        let longest = matchers
            .iter()
            .enumerate()
            .filter(|(_, matcher)| matcher.as_ref().is_some_and(|m| m.is_match(entry)))
            .map(|(index, _)| index)
            .max_by_key(|&index| papers[index].title.trim().chars().count());
        listed.extend(longest);
    }
    listed
}

/// Accept or reject a reconciled survey.
///
/// # Errors
///
/// Returns the first rule the survey breaks.
pub fn validate_survey(
    text: &str,
    papers: &[Paper],
    rules: &ValidationRules,
) -> Result<(), ValidationError> {
    let Ok((body, references)) = split_references(text) else {
        return Err(ValidationError::MissingSection(
            REFERENCES_HEADING.trim_start_matches('#').trim().to_string(),
        ));
    };

    for section in &rules.required_sections {
        if !has_heading(body, section) {
            return Err(ValidationError::MissingSection(section.clone()));
        }
    }

    let words = body.split_whitespace().count();
    if words < rules.min_words {
        return Err(ValidationError::TooShort { words, min: rules.min_words });
    }

    let found = reference_entries(references).len();
    if found < rules.min_references {
        return Err(ValidationError::TooFewReferences { found, min: rules.min_references });
    }

    verify_bijection(text, papers)
}

/// Whether any Markdown heading in `body` mentions `name`, ignoring case.
fn has_heading(body: &str, name: &str) -> bool {
    let name = name.to_lowercase();
    body.lines()
        .map(str::trim_start)
        .filter(|line| line.starts_with('#'))
        .any(|line| line.trim_start_matches('#').to_lowercase().contains(&name))
}
