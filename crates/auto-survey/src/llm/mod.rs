//! Completion service abstraction.
//!
//! The pipeline talks to a language model through [`CompletionService`]:
//! role-tagged messages in, free text or schema-constrained JSON out.
//! [`complete_structured`] turns a constrained reply into a typed value or a
//! typed [`LlmError::InvalidStructuredResponse`].

mod openai;

pub use openai::OpenAiCompatibleClient;

use serde::{Deserialize, Serialize};

use crate::error::{LlmError, LlmResult};
use crate::models::StructuredOutput;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the conversation.
    System,
    /// The request.
    User,
    /// A previous model reply.
    Assistant,
}

/// A role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who is speaking.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// System message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// User message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Output schema constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    /// Schema name.
    pub name: &'static str,
    /// JSON schema of the expected object.
    pub schema: serde_json::Value,
}

impl ResponseSchema {
    /// Schema for a structured output type.
    #[must_use]
    pub fn of<T: StructuredOutput>() -> Self {
        Self { name: T::SCHEMA_NAME, schema: T::response_schema() }
    }
}

/// One completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Optional output schema.
    pub response_schema: Option<ResponseSchema>,
}

impl CompletionRequest {
    /// Free-text request.
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>, temperature: f32, max_tokens: u32) -> Self {
        Self { messages, temperature, max_tokens, response_schema: None }
    }

    /// Constrain the reply to `T`'s schema.
    #[must_use]
    pub fn with_schema<T: StructuredOutput>(mut self) -> Self {
        self.response_schema = Some(ResponseSchema::of::<T>());
        self
    }

    /// Text of the last user message, if any.
    #[must_use]
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
            .map(|message| message.content.as_str())
    }
}

/// A language model completion endpoint.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Run one completion and return the raw reply text.
    async fn complete(&self, request: CompletionRequest) -> LlmResult<String>;
}

/// Run a schema-constrained completion and decode the reply as `T`.
///
/// # Errors
///
/// Returns [`LlmError::InvalidStructuredResponse`] if the reply does not match
/// `T`, or the service's own error if the call fails.
pub async fn complete_structured<T: StructuredOutput>(
    service: &dyn CompletionService,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
) -> LlmResult<T> {
    let request = CompletionRequest::new(messages, temperature, max_tokens).with_schema::<T>();
    let reply = service.complete(request).await?;
    parse_structured(&reply)
}

/// Decode a structured reply, tolerating a surrounding Markdown code fence.
///
/// # Errors
///
/// Returns [`LlmError::InvalidStructuredResponse`] if decoding fails.
pub fn parse_structured<T: StructuredOutput>(reply: &str) -> LlmResult<T> {
    serde_json::from_str(strip_code_fence(reply)).map_err(|source| {
        LlmError::InvalidStructuredResponse { schema: T::SCHEMA_NAME, source }
    })
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // Drop an info string such as `json` on the opening fence line.
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}
