//! Structured completion-service responses.
//!
//! Every structured call in the pipeline uses exactly one of these shapes.
//! The JSON schema sent to the service is derived from the type itself.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A response shape the completion service can be constrained to.
pub trait StructuredOutput: DeserializeOwned + JsonSchema {
    /// Schema name sent with the request and reported in errors.
    const SCHEMA_NAME: &'static str;

    /// JSON schema describing the shape.
    #[must_use]
    fn response_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Self)).unwrap_or_default()
    }
}

/// Search queries proposed by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Queries {
    /// Search queries, one line each.
    pub queries: Vec<String>,
}

impl StructuredOutput for Queries {
    const SCHEMA_NAME: &'static str = "queries";
}

/// Relevance verdict for a paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IsRelevant {
    /// True if the paper is relevant to the topic.
    pub is_relevant: bool,
}

impl StructuredOutput for IsRelevant {
    const SCHEMA_NAME: &'static str = "is_relevant";
}

/// Topic-focused summary of a paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    /// The summary text.
    pub summary: String,
}

impl StructuredOutput for Summary {
    const SCHEMA_NAME: &'static str = "summary";
}
