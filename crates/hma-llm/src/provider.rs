//! The LLM provider trait — spec §4.5's narrow boundary.
//!
//! `generate_response` looks synchronous to callers (one `String` in, one
//! `String` out) even though every implementation is async underneath.

use hma_core::Message;

pub type LlmResult<T> = Result<T, LlmError>;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Generate one completion from the given conversation. Callers pass
    /// the full message history; the provider returns the assistant's text.
    async fn generate_response(
        &self,
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
    ) -> LlmResult<String>;
}
