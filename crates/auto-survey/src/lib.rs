//! Automated literature surveys
//!
//! Searches Semantic Scholar for papers on a topic, keeps the ones a language
//! model judges relevant, summarises them from their full text and writes a
//! Markdown survey whose References section lists exactly the papers it cites.
//!
//! # Features
//!
//! - **Interleaved search**: several planned queries are paged in lockstep
//! - **Two-pass relevance**: papers are judged on their abstract and again on their summary
//! - **Reference reconciliation**: References are rebuilt from the citations actually made
//! - **Rate-limited**: waits out 429 responses from the paper index
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use auto_survey::{
//!     Config, HttpDocumentFetcher, LlmConfig, OpenAiCompatibleClient, SemanticScholarClient,
//!     SurveyPipeline, SurveySettings,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let index = SemanticScholarClient::new(Config::from_env())?;
//!     let llm = OpenAiCompatibleClient::new(LlmConfig::default())?;
//!     let fetcher = HttpDocumentFetcher::new(std::time::Duration::from_secs(30))?;
//!
//!     let pipeline = SurveyPipeline::new(
//!         Arc::new(index),
//!         Arc::new(llm),
//!         Arc::new(fetcher),
//!         SurveySettings::default(),
//!     );
//!     let report = pipeline.run("graph neural networks").await?;
//!     println!("{}", report.markdown);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod reconcile;
pub mod render;
pub mod search;
pub mod summarize;
pub mod writing;

pub use client::{PaperIndex, SearchPage, SemanticScholarClient};
pub use config::{Config, LlmConfig, ReconcileStrategy, SurveySettings, ValidationRules};
pub use error::{ClientError, LlmError, SurveyError, SurveyResult};
pub use llm::{CompletionService, OpenAiCompatibleClient};
pub use models::{Author, Paper};
pub use pipeline::{SurveyPipeline, SurveyReport, save_markdown, survey_markdown_path};
pub use render::{DocumentRenderer, PandocRenderer};
pub use summarize::{DocumentFetcher, HttpDocumentFetcher};
pub use writing::SurveyWriter;
