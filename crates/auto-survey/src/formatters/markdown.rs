//! Markdown rendering of papers for writer prompts.

use crate::models::{Paper, UNKNOWN_YEAR};

/// Format a list of papers as Markdown blocks separated by blank lines.
#[must_use]
pub fn format_papers_markdown(papers: &[Paper]) -> String {
    papers.iter().map(format_paper_markdown).collect::<Vec<_>>().join("\n\n")
}

/// Format a single paper as a Markdown block.
#[must_use]
pub fn format_paper_markdown(paper: &Paper) -> String {
    let authors = paper
        .authors
        .iter()
        .map(|a| format!("{} {}", a.first_name, a.last_name).trim().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let year = if paper.year == UNKNOWN_YEAR {
        "Unknown Year".to_string()
    } else {
        paper.year.to_string()
    };
    let venue = if paper.venue.is_empty() { "Unknown Venue" } else { &paper.venue };
    let url = if paper.url.is_empty() { "Unknown URL" } else { &paper.url };
    let summary = if paper.summary.is_empty() { "No summary available." } else { &paper.summary };

    format!(
        "## {}\n\n**Authors:** {authors}\n**Year:** {year}\n**Venue:** {venue}\n\
         **URL:** {url}\n**Summary:** {summary}",
        paper.title
    )
}

/// Format papers the draft failed to cite, with the citation forms to use.
#[must_use]
pub fn format_missing_citations(papers: &[Paper]) -> String {
    papers
        .iter()
        .map(|paper| {
            format!(
                "- \"{}\": cite as {} or {}",
                paper.title,
                paper.narrative_citation(),
                paper.parenthetical_citation()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Author;

    #[test]
    fn test_format_paper_markdown_placeholders() {
        let paper = Paper { title: "Lonely".into(), year: UNKNOWN_YEAR, ..Default::default() };
        let md = format_paper_markdown(&paper);
        assert!(md.starts_with("## Lonely"));
        assert!(md.contains("**Year:** Unknown Year"));
        assert!(md.contains("**Venue:** Unknown Venue"));
        assert!(md.contains("No summary available."));
    }

    #[test]
    fn test_format_papers_markdown_separates_blocks() {
        let papers = vec![
            Paper {
                title: "A".into(),
                authors: vec![Author::new("Ada", "Lovelace")],
                year: 1843,
                ..Default::default()
            },
            Paper { title: "B".into(), year: 2020, ..Default::default() },
        ];
        let md = format_papers_markdown(&papers);
        assert!(md.contains("**Authors:** Ada Lovelace"));
        assert!(md.contains("\n\n## B"));
    }

    #[test]
    fn test_format_missing_citations() {
        let papers = vec![Paper {
            title: "A".into(),
            authors: vec![Author::new("Ada", "Lovelace")],
            year: 1843,
            ..Default::default()
        }];
        assert_eq!(
            format_missing_citations(&papers),
            "- \"A\": cite as Lovelace (1843) or (Lovelace, 1843)"
        );
    }
}
