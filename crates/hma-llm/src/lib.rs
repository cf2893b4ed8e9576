//! hma-llm — the narrow LLM capability boundary.
//!
//! The rest of the workspace only ever sees `LlmProvider::generate_response`.
//! Concrete HTTP clients live behind it; callers never see a request/response
//! wire shape, a streaming delta, or a provider-specific error beyond
//! `LlmError`.

pub mod anthropic;
pub mod console;
pub mod mock;
pub mod provider;

pub use anthropic::AnthropicLlmProvider;
pub use console::ConsoleLlmProvider;
pub use mock::MockLlmProvider;
pub use provider::{LlmError, LlmProvider, LlmResult};
