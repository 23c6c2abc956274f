//! Survey drafting and reconciliation.

use crate::config::{ReconcileStrategy, ValidationRules};
use crate::error::SurveyResult;
use crate::formatters::format_papers_markdown;
use crate::llm::{ChatMessage, CompletionRequest, CompletionService};
use crate::models::Paper;
use crate::reconcile::{
    find_missing_citations, prune_uncited, rebuild_references, request_citation_repair,
    validate_survey,
};

const SYSTEM_PROMPT: &str = "You are an expert academic researcher and writer.

Your task is to write a literature survey on a given topic using the provided relevant papers. \
The literature survey should be well-structured, comprehensive, and written in clear, concise \
English.

The literature survey should be formatted in Markdown, with appropriate headings, subheadings, \
and paragraphs. Rather than simply listing each paper summary one after the other, you should \
synthesise the information from the papers to provide a coherent overview of the topic.

The survey should include:
- An introduction to the topic (named \"Introduction\"), explaining its significance and context.
- 2-3 main content sections, each with multiple paragraphs separated by double newlines, \
covering different aspects of the topic. Each section should synthesise information from \
multiple papers, highlighting information that is relevant to the topic.
- A conclusion (named \"Conclusion\") that summarises the key points discussed in the survey.
- A references section (named \"References\") that lists all the papers cited in the survey, \
formatted in APA style. This means that the references should be of the form \"Author (Year)\" \
or \"(Author, Year)\", depending on the sentence structure. If there are 2 authors use \
\"Author1 and Author2 (Year)\" or \"(Author1 and Author2, Year)\". If there are 3 or more \
authors use \"Author1 et al. (Year)\" or \"(Author1 et al., Year)\". All references in the \
References section should be separated by double newlines.
- In the References section, the papers should be listed in alphabetical order by the surname \
of the first author, and then by year of publication (earliest first) for papers with the same \
first author.
- All references in the References section must contain the authors, title of the paper, venue \
and year.
- After \"## References\" there should only be references for the remainder of the literature \
survey, and nothing else.

Return only the Markdown content of the literature survey, without any additional commentary \
or explanation.";

const DRAFT_TEMPERATURE: f32 = 0.5;
const DRAFT_MAX_TOKENS: u32 = 10_000;

/// Writes a survey from summarised papers and makes its References section
/// agree with its citations.
pub struct SurveyWriter<'a> {
    llm: &'a dyn CompletionService,
    strategy: ReconcileStrategy,
    rules: ValidationRules,
}

impl<'a> SurveyWriter<'a> {
    /// Create a writer using [`ReconcileStrategy::Rebuild`] and the default
    /// validation rules.
    #[must_use]
    pub fn new(llm: &'a dyn CompletionService) -> Self {
        Self { llm, strategy: ReconcileStrategy::default(), rules: ValidationRules::default() }
    }

    /// Use another reconciliation strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: ReconcileStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Use other acceptance rules.
    #[must_use]
    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Write a survey on `topic` from `papers`.
    ///
    /// Every paper is offered to the model, and the whole list is used during
    /// reconciliation so unused papers can be left out of References.
    ///
    /// # Errors
    ///
    /// Returns an error if a completion fails, the draft has no References
    /// heading, or the reconciled survey breaks a validation rule.
    pub async fn write_survey(&self, topic: &str, papers: &[Paper]) -> SurveyResult<String> {
        tracing::info!(topic, papers = papers.len(), "Writing literature survey");

        // Links would only clutter the model's reference list.
        let papers: Vec<Paper> =
            papers.iter().cloned().map(|paper| Paper { url: String::new(), ..paper }).collect();

        let user_prompt = build_user_prompt(topic, &papers);
        let request = CompletionRequest::new(
            vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(&user_prompt)],
            DRAFT_TEMPERATURE,
            DRAFT_MAX_TOKENS,
        );
        let draft = self.llm.complete(request).await?;

        let survey = self.reconcile(&draft, &papers, &user_prompt).await?;
        validate_survey(&survey, &papers, &self.rules)?;

        tracing::info!(chars = survey.len(), "Survey written");
        Ok(survey)
    }

    async fn reconcile(
        &self,
        draft: &str,
        papers: &[Paper],
        user_prompt: &str,
    ) -> SurveyResult<String> {
        match self.strategy {
            ReconcileStrategy::Rebuild => Ok(rebuild_references(draft, papers)?),
            ReconcileStrategy::RepairAndPrune => {
                let missing = find_missing_citations(draft, papers);
                let text = if missing.is_empty() {
                    draft.to_string()
                } else {
                    request_citation_repair(self.llm, draft, &missing, SYSTEM_PROMPT, user_prompt)
                        .await?
                };

                let still_missing = find_missing_citations(&text, papers);
                if !still_missing.is_empty() {
                    tracing::info!(count = still_missing.len(), "Pruning references never cited");
                }
                Ok(prune_uncited(&text, &still_missing)?)
            }
        }
    }
}

/// User turn asking for a survey on `topic` from `papers`.
#[must_use]
pub fn build_user_prompt(topic: &str, papers: &[Paper]) -> String {
    format!(
        "Write a literature survey on the topic of {topic:?}, using the following relevant \
         papers:\n\n<papers>\n{}\n</papers>",
        format_papers_markdown(papers)
    )
}
