//! Paper data model and its citation forms.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::author::{Author, UNKNOWN_AUTHOR};
use super::record::SearchRecord;

/// Sentinel year for papers whose publication year is unknown.
pub const UNKNOWN_YEAR: i32 = -1;

/// Earliest publication year accepted from the index.
const MIN_YEAR: i32 = 1900;

/// In-text citation surface forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationStyle {
    /// `Author (Year)`, used as part of a sentence.
    Narrative,
    /// `(Author, Year)`, used after a claim.
    Parenthetical,
}

/// A research paper.
///
/// Equality and hashing cover every field, so two independently fetched
/// papers with identical content are interchangeable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Paper {
    /// Paper title.
    pub title: String,

    /// Authors in citation order.
    pub authors: Vec<Author>,

    /// Publication year, or [`UNKNOWN_YEAR`].
    pub year: i32,

    /// Journal or conference name; may be empty.
    pub venue: String,

    /// Full-text link, preferably a DOI; may be empty.
    pub url: String,

    /// Abstract from the index, replaced by the topic-focused summary.
    pub summary: String,
}

impl Paper {
    /// Build a paper from a raw search record, substituting defaults for
    /// anything missing.
    #[must_use]
    pub fn from_record(record: SearchRecord) -> Self {
        let current_year = chrono::Utc::now().year();
        let year = match record.year {
            Some(year) if (MIN_YEAR..=current_year).contains(&year) => year,
            Some(year) => {
                tracing::debug!(year, "Discarding out-of-range publication year");
                UNKNOWN_YEAR
            }
            None => UNKNOWN_YEAR,
        };

        Self {
            title: record.title.unwrap_or_default(),
            authors: record
                .authors
                .into_iter()
                .flatten()
                .filter_map(|author| author.name)
                .map(|name| Author::from_full_name(&name))
                .collect(),
            year,
            venue: record.publication_venue.and_then(|v| v.name).unwrap_or_default(),
            url: record.open_access_pdf.and_then(|pdf| pdf.url).unwrap_or_default(),
            summary: record.r#abstract.unwrap_or_default(),
        }
    }

    /// Year as shown in citations: the year itself or `n.d.`.
    #[must_use]
    pub fn year_label(&self) -> String {
        if self.year == UNKNOWN_YEAR { "n.d.".to_string() } else { self.year.to_string() }
    }

    /// Author part of an in-text citation.
    #[must_use]
    pub fn citation_authors(&self) -> String {
        match self.authors.as_slice() {
            [] => UNKNOWN_AUTHOR.to_string(),
            [only] => only.surname().to_string(),
            [first, second] => format!("{} and {}", first.surname(), second.surname()),
            [first, ..] => format!("{} et al.", first.surname()),
        }
    }

    /// In-text citation in the requested surface form.
    #[must_use]
    pub fn citation(&self, style: CitationStyle) -> String {
        match style {
            CitationStyle::Narrative => {
                format!("{} ({})", self.citation_authors(), self.year_label())
            }
            CitationStyle::Parenthetical => {
                format!("({}, {})", self.citation_authors(), self.year_label())
            }
        }
    }

    /// `Author (Year)`.
    #[must_use]
    pub fn narrative_citation(&self) -> String {
        self.citation(CitationStyle::Narrative)
    }

    /// `(Author, Year)`.
    #[must_use]
    pub fn parenthetical_citation(&self) -> String {
        self.citation(CitationStyle::Parenthetical)
    }

    /// APA-style References entry:
    /// `Last, First and Last, First (Year). Title. _Venue_.`
    #[must_use]
    pub fn reference_entry(&self) -> String {
        let authors = if self.authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            self.authors.iter().map(Author::display_name).collect::<Vec<_>>().join(" and ")
        };

        let mut entry = format!("{authors} ({}). {}.", self.year_label(), title_case(&self.title));
        if !self.venue.is_empty() {
            entry.push_str(&format!(" _{}_.", title_case(&self.venue)));
        }
        entry
    }

    /// Sort key for the References section; empty when there are no authors.
    #[must_use]
    pub fn first_author_surname(&self) -> &str {
        self.authors.first().map_or("", |author| author.last_name.as_str())
    }
}

/// Capitalise the first letter of every run of letters and lowercase the rest.
///
/// `"test-driven development"` becomes `"Test-Driven Development"`.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                output.extend(c.to_lowercase());
            } else {
                output.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            output.push(c);
            previous_is_letter = false;
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{AuthorRecord, OpenAccessPdf, PublicationVenue};

    fn paper_with_authors(authors: Vec<Author>) -> Paper {
        Paper {
            title: "a study of things".to_string(),
            authors,
            year: 2020,
            venue: "journal of testing".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("Test-Driven Development"), "Test-Driven Development");
        assert_eq!(title_case("Journal of Testing"), "Journal Of Testing");
        assert_eq!(title_case("BERT for NLP"), "Bert For Nlp");
        assert_eq!(title_case("3d vision"), "3D Vision");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_unknown_year_label() {
        let paper = Paper { year: UNKNOWN_YEAR, ..paper_with_authors(vec![]) };
        assert_eq!(paper.narrative_citation(), "Unknown Author (n.d.)");
        assert_eq!(paper.parenthetical_citation(), "(Unknown Author, n.d.)");
    }

    #[test]
    fn test_reference_entry_without_venue() {
        let paper = Paper {
            venue: String::new(),
            ..paper_with_authors(vec![Author::new("Ada", "Lovelace")])
        };
        assert_eq!(paper.reference_entry(), "Lovelace, Ada (2020). A Study Of Things.");
    }

    #[test]
    fn test_reference_entry_unknown_author() {
        let paper = paper_with_authors(vec![]);
        assert_eq!(
            paper.reference_entry(),
            "Unknown Author (2020). A Study Of Things. _Journal Of Testing_."
        );
        assert_eq!(paper.first_author_surname(), "");
    }

    #[test]
    fn test_from_record_defaults() {
        let paper = Paper::from_record(SearchRecord::default());
        assert_eq!(paper, Paper { year: UNKNOWN_YEAR, ..Default::default() });
    }

    #[test]
    fn test_from_record_full() {
        let record = SearchRecord {
            title: Some("Attention Is All You Need".to_string()),
            authors: vec![
                Some(AuthorRecord { name: Some("Ashish Vaswani".to_string()) }),
                None,
                Some(AuthorRecord { name: None }),
                Some(AuthorRecord { name: Some("Noam M. Shazeer".to_string()) }),
            ],
            year: Some(2017),
            publication_venue: Some(PublicationVenue { name: Some("NeurIPS".to_string()) }),
            open_access_pdf: Some(OpenAccessPdf {
                url: Some("https://arxiv.org/pdf/1706.03762".to_string()),
            }),
            r#abstract: Some("The dominant sequence transduction models...".to_string()),
        };

        let paper = Paper::from_record(record);
        assert_eq!(
            paper.authors,
            vec![Author::new("Ashish", "Vaswani"), Author::new("Noam", "Shazeer")]
        );
        assert_eq!(paper.year, 2017);
        assert_eq!(paper.venue, "NeurIPS");
        assert_eq!(paper.url, "https://arxiv.org/pdf/1706.03762");
        assert_eq!(paper.narrative_citation(), "Vaswani and Shazeer (2017)");
    }

    #[test]
    fn test_from_record_rejects_implausible_year() {
        let record = SearchRecord { year: Some(1066), ..Default::default() };
        assert_eq!(Paper::from_record(record).year, UNKNOWN_YEAR);

        let record = SearchRecord { year: Some(9999), ..Default::default() };
        assert_eq!(Paper::from_record(record).year, UNKNOWN_YEAR);
    }
}
