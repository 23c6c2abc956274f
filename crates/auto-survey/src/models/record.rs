//! Raw search records as returned by the Semantic Scholar paper search.

use serde::{Deserialize, Serialize};

/// One page of paper search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total number of matching papers.
    #[serde(default)]
    pub total: i64,

    /// Offset of this page.
    #[serde(default)]
    pub offset: i64,

    /// Offset of the next page, if any.
    #[serde(default)]
    pub next: Option<i64>,

    /// Records in this page. Individual entries may be null.
    #[serde(default)]
    pub data: Option<Vec<Option<SearchRecord>>>,
}

impl SearchResponse {
    /// Non-null records of this page.
    #[must_use]
    pub fn into_records(self) -> Vec<SearchRecord> {
        self.data.unwrap_or_default().into_iter().flatten().collect()
    }
}

/// A paper record with every field optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    /// Paper title.
    #[serde(default)]
    pub title: Option<String>,

    /// Authors; entries may be null.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<Option<AuthorRecord>>,

    /// Publication year.
    #[serde(default)]
    pub year: Option<i32>,

    /// Venue details.
    #[serde(default)]
    pub publication_venue: Option<PublicationVenue>,

    /// Open access PDF information.
    #[serde(default)]
    pub open_access_pdf: Option<OpenAccessPdf>,

    /// Paper abstract.
    #[serde(default)]
    pub r#abstract: Option<String>,
}

/// Author reference inside a search record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorRecord {
    /// Full display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Venue reference inside a search record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicationVenue {
    /// Venue name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Open access PDF information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAccessPdf {
    /// Direct URL to the PDF.
    #[serde(default)]
    pub url: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
