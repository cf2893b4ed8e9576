//! Interactive provider used when no API key is configured — prints the
//! conversation to stdout and reads the "response" from stdin. Lets the
//! orchestrator be exercised end-to-end without a live backend.

use crate::provider::{LlmError, LlmProvider, LlmResult};
use hma_core::Message;
use std::io::{self, BufRead, Write as _};
use tokio::task;

pub struct ConsoleLlmProvider;

impl ConsoleLlmProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ConsoleLlmProvider {
    fn name(&self) -> &str {
        "console"
    }

    async fn generate_response(
        &self,
        messages: &[Message],
        _temperature: f32,
        _max_tokens: u32,
    ) -> LlmResult<String> {
        let transcript: Vec<Message> = messages.to_vec();

        task::spawn_blocking(move || {
            println!("\n--- conversation ---");
            for m in &transcript {
                println!("[{:?}] {}", m.role, m.content);
            }
            print!("--- enter response, end with a blank line ---\n> ");
            io::stdout().flush().ok();

            let stdin = io::stdin();
            let mut lines = Vec::new();
            for line in stdin.lock().lines() {
                let line = line.map_err(|e| LlmError::RequestFailed(e.to_string()))?;
                if line.is_empty() {
                    break;
                }
                lines.push(line);
            }
            Ok(lines.join("\n"))
        })
        .await
        .map_err(|e| LlmError::RequestFailed(e.to_string()))?
    }
}
