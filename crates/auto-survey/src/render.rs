//! Markdown to PDF conversion with external tools.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::RenderError;

/// Converts a persisted Markdown survey into a PDF next to it.
#[async_trait::async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Render `markdown_path` and return the path of the written PDF.
    async fn render(&self, markdown_path: &Path) -> Result<PathBuf, RenderError>;
}

/// Renders with `pandoc`, using `weasyprint` as the PDF engine.
#[derive(Debug, Clone)]
pub struct PandocRenderer {
    pandoc: String,
    pdf_engine: String,
    verbose: bool,
}

impl PandocRenderer {
    /// Create a renderer. When `verbose` is false the tools' own output is
    /// discarded.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { pandoc: "pandoc".to_string(), pdf_engine: "weasyprint".to_string(), verbose }
    }

    /// Use other executables for pandoc and the PDF engine.
    #[must_use]
    pub fn with_programs(
        mut self,
        pandoc: impl Into<String>,
        pdf_engine: impl Into<String>,
    ) -> Self {
        self.pandoc = pandoc.into();
        self.pdf_engine = pdf_engine.into();
        self
    }

    /// Required executables that do not answer `--version`.
    pub async fn missing_tools(&self) -> Vec<&str> {
        let mut missing = Vec::new();
        for program in [self.pandoc.as_str(), self.pdf_engine.as_str()] {
            if !is_available(program).await {
                missing.push(program);
            }
        }
        missing
    }

    /// Shell command that performs the same conversion by hand.
    #[must_use]
    pub fn manual_command(&self, markdown_path: &Path, pdf_path: &Path) -> String {
        format!(
            "{} --from=markdown --to=pdf --output={} --pdf-engine={} {}",
            self.pandoc,
            pdf_path.display(),
            self.pdf_engine,
            markdown_path.display()
        )
    }

    fn stdio(&self) -> Stdio {
        if self.verbose { Stdio::inherit() } else { Stdio::null() }
    }
}

#[async_trait::async_trait]
impl DocumentRenderer for PandocRenderer {
    async fn render(&self, markdown_path: &Path) -> Result<PathBuf, RenderError> {
        let pdf_path = markdown_path.with_extension("pdf");
        let command = self.manual_command(markdown_path, &pdf_path);

        let missing = self.missing_tools().await;
        if !missing.is_empty() {
            return Err(RenderError::ToolMissing { missing: missing.join(", "), command });
        }

        let markdown = tokio::fs::read_to_string(markdown_path).await?;

        tracing::info!(pdf = %pdf_path.display(), "Converting survey to PDF");

        let mut child = Command::new(&self.pandoc)
            .arg("--from=markdown")
            .arg("--to=pdf")
            .arg(format!("--output={}", pdf_path.display()))
            .arg(format!("--pdf-engine={}", self.pdf_engine))
            .stdin(Stdio::piped())
            .stdout(self.stdio())
            .stderr(self.stdio())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(markdown.as_bytes()).await?;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(RenderError::Failed { status: status.to_string(), command });
        }
        if !tokio::fs::try_exists(&pdf_path).await? {
            return Err(RenderError::Failed {
                status: "no PDF was written".to_string(),
                command,
            });
        }

        Ok(pdf_path)
    }
}

async fn is_available(program: &str) -> bool {
    match Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
    {
        Ok(status) => status.success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_command() {
        let renderer = PandocRenderer::new(false);
        let command =
            renderer.manual_command(Path::new("out/ai_survey.md"), Path::new("out/ai_survey.pdf"));
        assert_eq!(
            command,
            "pandoc --from=markdown --to=pdf --output=out/ai_survey.pdf \
             --pdf-engine=weasyprint out/ai_survey.md"
        );
    }

    #[tokio::test]
    async fn test_missing_tools_are_reported_with_command() {
        let renderer = PandocRenderer::new(false)
            .with_programs("auto-survey-no-such-pandoc", "auto-survey-no-such-engine");
        assert_eq!(
            renderer.missing_tools().await,
            vec!["auto-survey-no-such-pandoc", "auto-survey-no-such-engine"]
        );

        let err = renderer.render(Path::new("survey.md")).await.unwrap_err();
        match err {
            RenderError::ToolMissing { missing, command } => {
                assert!(missing.contains("auto-survey-no-such-engine"));
                assert!(command.contains("--output=survey.pdf"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
