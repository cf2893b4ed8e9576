//! Scripted provider for tests — not gated behind `#[cfg(test)]` since
//! `hma-agent`'s test suite depends on it from another crate.

use crate::provider::{LlmError, LlmProvider, LlmResult};
use hma_core::Message;
use tokio::sync::Mutex;

pub struct MockLlmProvider {
    responses: Mutex<Vec<String>>,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).rev().collect()),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_response(
        &self,
        _messages: &[Message],
        _temperature: f32,
        _max_tokens: u32,
    ) -> LlmResult<String> {
        self.responses
            .lock()
            .await
            .pop()
            .ok_or_else(|| LlmError::RequestFailed("mock response queue exhausted".to_string()))
    }
}
