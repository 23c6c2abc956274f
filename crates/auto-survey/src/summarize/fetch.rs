//! Download a paper's full text and convert it to plain text.

use std::time::Duration;

use reqwest::Client;

use crate::config::api;
use crate::error::FetchError;

/// Line width used when rendering HTML to text.
const HTML_TEXT_WIDTH: usize = 120;

/// Turns a paper link into readable text.
#[async_trait::async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch `url` and return its content as text.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches PDFs and web pages over HTTP.
///
/// PDFs are converted with `lopdf` text extraction and HTML with `html2text`;
/// anything else must already be UTF-8 text.
#[derive(Debug, Clone)]
pub struct HttpDocumentFetcher {
    client: Client,
}

impl HttpDocumentFetcher {
    /// Create a fetcher with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(api::USER_AGENT)
            .timeout(timeout)
            .connect_timeout(api::CONNECT_TIMEOUT)
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let parsed = url::Url::parse(url)
            .map_err(|e| FetchError::InvalidUrl { url: url.to_string(), message: e.to_string() })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let connection_error = |e: reqwest::Error| FetchError::Connection {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(parsed).send().await.map_err(connection_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(FetchError::Forbidden { url: url.to_string() });
        }
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        let body = response.bytes().await.map_err(connection_error)?.to_vec();

        let text = body_to_text(&content_type, body)
            .await
            .map_err(|message| FetchError::Conversion { url: url.to_string(), message })?;

        if text.trim().is_empty() {
            return Err(FetchError::Conversion {
                url: url.to_string(),
                message: "document contains no extractable text".to_string(),
            });
        }

        tracing::debug!(url, chars = text.len(), "Fetched full text");
        Ok(text)
    }
}

/// Convert a response body to text according to its type.
async fn body_to_text(content_type: &str, body: Vec<u8>) -> Result<String, String> {
    if body.starts_with(b"%PDF") || content_type.contains("pdf") {
        tokio::task::spawn_blocking(move || pdf_to_text(&body)).await.map_err(|e| e.to_string())?
    } else if content_type.contains("html") {
        html2text::from_read(body.as_slice(), HTML_TEXT_WIDTH).map_err(|e| e.to_string())
    } else {
        String::from_utf8(body).map_err(|e| e.to_string())
    }
}

/// Extract the text of every page of an in-memory PDF.
fn pdf_to_text(bytes: &[u8]) -> Result<String, String> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| e.to_string())?;
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    document.extract_text(&pages).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_to_text_rejects_garbage() {
        assert!(pdf_to_text(b"%PDF-1.7 definitely not a pdf").is_err());
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_fetched() {
        let fetcher = HttpDocumentFetcher::new(Duration::from_secs(1)).unwrap();
        let err = fetcher.fetch_text("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));

        let err = fetcher.fetch_text("ftp://example.org/paper.pdf").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
