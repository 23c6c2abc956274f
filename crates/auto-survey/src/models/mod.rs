//! Data models for papers, raw index records and structured LLM responses.
//!
//! Raw records use `#[serde(default)]` for every field so that null or missing
//! values coming back from the paper index never fail deserialization.

mod author;
mod paper;
mod record;
mod responses;

pub use author::{Author, UNKNOWN_AUTHOR};
pub use paper::{CitationStyle, Paper, UNKNOWN_YEAR, title_case};
pub use record::{AuthorRecord, OpenAccessPdf, PublicationVenue, SearchRecord, SearchResponse};
pub use responses::{IsRelevant, Queries, StructuredOutput, Summary};
