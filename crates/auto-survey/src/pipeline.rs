//! End-to-end survey production.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::client::PaperIndex;
use crate::config::SurveySettings;
use crate::error::{SurveyError, SurveyResult};
use crate::llm::CompletionService;
use crate::models::Paper;
use crate::search::{PaperCollector, filter_relevant};
use crate::summarize::{DocumentFetcher, PaperSummarizer, SummarizeOptions};
use crate::writing::SurveyWriter;

/// Stem used when a topic has no characters usable in a file name.
const FALLBACK_STEM: &str = "literature";

/// A finished survey and the papers it was written from.
#[derive(Debug, Clone)]
pub struct SurveyReport {
    /// Topic the survey covers.
    pub topic: String,
    /// Reconciled and validated Markdown.
    pub markdown: String,
    /// Papers offered to the writer, with topic-focused summaries.
    pub papers: Vec<Paper>,
}

/// Runs search, summarisation, re-filtering and writing in sequence.
pub struct SurveyPipeline {
    index: Arc<dyn PaperIndex>,
    llm: Arc<dyn CompletionService>,
    fetcher: Arc<dyn DocumentFetcher>,
    settings: SurveySettings,
}

impl SurveyPipeline {
    /// Create a pipeline from its collaborators.
    #[must_use]
    pub fn new(
        index: Arc<dyn PaperIndex>,
        llm: Arc<dyn CompletionService>,
        fetcher: Arc<dyn DocumentFetcher>,
        settings: SurveySettings,
    ) -> Self {
        Self { index, llm, fetcher, settings }
    }

    /// Settings the pipeline runs with.
    #[must_use]
    pub const fn settings(&self) -> &SurveySettings {
        &self.settings
    }

    /// Produce a survey on `topic`.
    ///
    /// Each stage consumes the complete output of the previous one. Papers are
    /// judged twice: on their abstracts while searching, then again on their
    /// full-text summaries.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error from any stage.
    pub async fn run(&self, topic: &str) -> SurveyResult<SurveyReport> {
        let settings = &self.settings;
        let llm = self.llm.as_ref();

        let papers = PaperCollector::new(self.index.as_ref(), llm, settings.num_queries)
            .with_max_sweeps(settings.max_sweeps)
            .collect_papers(topic, settings.num_papers, settings.batch_size)
            .await?;
        if papers.is_empty() {
            tracing::warn!(topic, "No relevant papers found");
        }

        let options = SummarizeOptions::from(settings);
        let papers = PaperSummarizer::new(llm, self.fetcher.as_ref(), options)
            .summarize_all(papers, topic, settings.summarize_concurrency)
            .await?;

        let papers = filter_relevant(llm, papers, topic).await?;
        tracing::info!(count = papers.len(), "Papers still relevant after reading them");

        let markdown = SurveyWriter::new(llm)
            .with_strategy(settings.reconcile_strategy)
            .with_rules(settings.validation.clone())
            .write_survey(topic, &papers)
            .await?;

        Ok(SurveyReport { topic: topic.to_string(), markdown, papers })
    }
}

impl std::fmt::Debug for SurveyPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurveyPipeline").field("settings", &self.settings).finish()
    }
}

/// File name stem for a survey on `topic`.
///
/// Lowercased, spaces become underscores and anything outside `[a-z_]` is
/// dropped.
#[must_use]
pub fn survey_file_stem(topic: &str) -> String {
    let stem: String = topic
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_lowercase() || *c == '_')
        .collect();
    if stem.trim_matches('_').is_empty() { FALLBACK_STEM.to_string() } else { stem }
}

/// Where the Markdown survey on `topic` is written inside `output_dir`.
#[must_use]
pub fn survey_markdown_path(output_dir: &Path, topic: &str) -> PathBuf {
    output_dir.join(format!("{}_survey.md", survey_file_stem(topic)))
}

/// Write `text` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`SurveyError::InvalidArtifactPath`] unless `path` ends in `.md`,
/// or an I/O error if writing fails.
pub async fn save_markdown(path: &Path, text: &str) -> SurveyResult<()> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
        return Err(SurveyError::InvalidArtifactPath {
            path: path.to_path_buf(),
            reason: "a Markdown survey must have the .md extension".to_string(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, text).await?;

    tracing::info!(path = %path.display(), "Wrote Markdown survey");
    Ok(())
}
