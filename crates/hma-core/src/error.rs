//! Error taxonomy shared across the orchestrator.
//!
//! `Error` is the general-purpose error for core/config/IO concerns.
//! `InterpreterError` is the taxonomy directives fail with (spec §7); most
//! variants are recovered locally by the interpreter (turned into a prompt
//! enqueued on the failing agent) rather than propagated. Only
//! `ActivationError` crosses an agent boundary to its parent.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    ConfigError(String),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("llm error: {provider} - {message}")]
    LlmError { provider: String, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn llm_error(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LlmError {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while parsing or executing a single directive.
///
/// Every variant has a corresponding plain-text prompt (see
/// `InterpreterError::recovery_prompt`) that the interpreter enqueues on the
/// failing agent so the LLM can react — this is the local-recovery-by-default
/// policy. `ActivationError` is the one exception: it propagates to the
/// agent's parent instead of being recovered in place.
#[derive(Error, Debug)]
pub enum InterpreterError {
    #[error("failed to parse directive: {0}")]
    ParseError(String),

    #[error("scope violation: {0}")]
    ScopeError(String),

    #[error("string not found: {0}")]
    MissingString(String),

    #[error("ambiguous string match: {0}")]
    AmbiguousString(String),

    #[error("command not in allow-list: {0}")]
    InvalidCommand(String),

    #[error("command timed out after {0}s: {1}")]
    CommandTimeout(u64, String),

    #[error("unknown ephemeral type: {0}")]
    UnknownEphemeralType(String),

    #[error("nothing to wait for")]
    NothingToWaitFor,

    #[error("active ephemeral agents still running: {0}")]
    ActiveEphemeralAgents(usize),

    #[error("active children still running: {0}")]
    ActiveChildren(usize),

    #[error("no parent to report to")]
    NoParent,

    #[error("filesystem error: {0}")]
    Filesystem(String),

    /// Raised when an agent cannot be activated (e.g. its root is gone).
    /// Unlike every other variant, this propagates to the parent instead of
    /// being enqueued as a self-prompt.
    #[error("activation failed: {0}")]
    ActivationError(String),
}

impl InterpreterError {
    /// The plain-text prompt enqueued on the agent that hit this error,
    /// following the original interpreters' `_queue_self_prompt` messages.
    pub fn recovery_prompt(&self) -> String {
        match self {
            Self::ParseError(msg) => format!(
                "PARSING FAILED: {}\n\nMOST COMMON ISSUE: Multiple directives on same \
                 api call, use sequential API calls, aka only one line per API call",
                msg
            ),
            Self::ScopeError(msg) => msg.clone(),
            Self::MissingString(msg) => msg.clone(),
            Self::AmbiguousString(msg) => msg.clone(),
            Self::InvalidCommand(cmd) => format!("Invalid command: {}", cmd),
            Self::CommandTimeout(secs, cmd) => {
                format!("Command timed out after {} minutes: {}", secs / 60, cmd)
            }
            Self::UnknownEphemeralType(t) => format!("SPAWN failed: Unknown ephemeral type: {}", t),
            Self::NothingToWaitFor => {
                "WAIT failed: No active children or ephemeral agents to wait for".to_string()
            }
            Self::ActiveEphemeralAgents(n) => format!(
                "FINISH failed: Cannot finish with {} active ephemeral agents still running",
                n
            ),
            Self::ActiveChildren(n) => format!(
                "FINISH failed: Cannot finish with {} active child agent(s) still working",
                n
            ),
            Self::NoParent => "FINISH failed: No parent to report result to".to_string(),
            Self::Filesystem(msg) => msg.clone(),
            Self::ActivationError(msg) => msg.clone(),
        }
    }

    /// True if this error is recovered by enqueueing a prompt on the current
    /// agent; false if it must propagate to the parent instead.
    pub fn is_locally_recoverable(&self) -> bool {
        !matches!(self, Self::ActivationError(_))
    }
}
