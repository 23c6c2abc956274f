//! Full-text retrieval and topic-focused summarisation of papers.

mod fetch;
mod summarizer;

pub use fetch::{DocumentFetcher, HttpDocumentFetcher};
pub use summarizer::{
    PaperSummarizer, SummarizeOptions, TRUNCATION_MARKER, fallback_document, truncate_middle,
};
