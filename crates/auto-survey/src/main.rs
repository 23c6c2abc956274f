//! Automated literature survey - Entry Point
//!
//! Writes `<output-dir>/<topic>_survey.md` and, when pandoc is installed, a PDF next to it.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use auto_survey::config::{api, llm};
use auto_survey::{
    Config, DocumentRenderer, HttpDocumentFetcher, LlmConfig, OpenAiCompatibleClient,
    PandocRenderer, ReconcileStrategy, SemanticScholarClient, SurveyPipeline, SurveySettings,
    save_markdown, survey_markdown_path,
};

#[derive(Parser, Debug)]
#[command(name = "auto-survey")]
#[command(about = "Conduct a literature survey on a topic")]
#[command(version)]
struct Cli {
    /// Topic of the literature survey
    topic: String,

    /// Model ID to use
    #[arg(long, default_value = llm::DEFAULT_MODEL, env = "AUTO_SURVEY_MODEL")]
    model: String,

    /// API base URL of a custom OpenAI-compatible inference server
    #[arg(long, env = "AUTO_SURVEY_BASE_URL")]
    base_url: Option<String>,

    /// Environment variable holding the inference server API key
    #[arg(long, default_value = llm::DEFAULT_API_KEY_ENV_VAR)]
    api_key_env_var: String,

    /// Semantic Scholar API key (optional, enables faster pacing)
    #[arg(long, env = "SEMANTIC_SCHOLAR_API_KEY", hide_env_values = true)]
    semantic_scholar_api_key: Option<String>,

    /// Number of relevant papers to find
    #[arg(long, default_value_t = 50)]
    num_papers: usize,

    /// Number of queries to generate for searching
    #[arg(long, default_value_t = 10)]
    num_queries: usize,

    /// Papers fetched per query in each search batch
    #[arg(long, default_value_t = 5)]
    search_batch_size: usize,

    /// Directory to save the output files in
    #[arg(long, default_value = "auto_survey_reports")]
    output_dir: PathBuf,

    /// How the References section is made to match the citations
    #[arg(long, value_enum, default_value = "rebuild")]
    reconcile: ReconcileMode,

    /// Show debug output and the PDF tools' own output
    #[arg(long)]
    verbose: bool,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Skip the PDF conversion
    #[arg(long)]
    no_pdf: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum ReconcileMode {
    /// Regenerate References from the papers actually cited
    #[default]
    Rebuild,
    /// Ask the model once for missing citations, then prune the rest
    RepairAndPrune,
}

impl From<ReconcileMode> for ReconcileStrategy {
    fn from(mode: ReconcileMode) -> Self {
        match mode {
            ReconcileMode::Rebuild => Self::Rebuild,
            ReconcileMode::RepairAndPrune => Self::RepairAndPrune,
        }
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose { "warn,auto_survey=debug" } else { "warn,auto_survey=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        topic = %cli.topic,
        model = %cli.model,
        "Starting literature survey"
    );

    let index = SemanticScholarClient::new(Config::new(cli.semantic_scholar_api_key))?;
    let llm_config = LlmConfig::new(cli.model, cli.base_url, None)
        .with_api_key_from_env(&cli.api_key_env_var);
    let completions = OpenAiCompatibleClient::new(llm_config)?;
    let fetcher = HttpDocumentFetcher::new(api::REQUEST_TIMEOUT)?;

    let settings = SurveySettings {
        num_papers: cli.num_papers,
        num_queries: cli.num_queries,
        batch_size: cli.search_batch_size,
        reconcile_strategy: cli.reconcile.into(),
        ..SurveySettings::default()
    };

    let pipeline =
        SurveyPipeline::new(Arc::new(index), Arc::new(completions), Arc::new(fetcher), settings);

    let report = match pipeline.run(&cli.topic).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Survey generation failed");
            anyhow::bail!(e.to_user_message());
        }
    };

    let markdown_path = survey_markdown_path(&cli.output_dir, &cli.topic);
    save_markdown(&markdown_path, &report.markdown).await?;

    if !cli.no_pdf {
        match PandocRenderer::new(cli.verbose).render(&markdown_path).await {
            Ok(pdf_path) => tracing::info!(path = %pdf_path.display(), "Wrote PDF survey"),
            Err(e) => tracing::warn!(error = %e, "PDF conversion skipped"),
        }
    }

    Ok(())
}
