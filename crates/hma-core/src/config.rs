//! Runtime configuration — resolved once at process startup, never mutated
//! after that (spec Design Notes: "global mutable state" is replaced with
//! immutable configuration threaded through `Arc<RuntimeConfig>`).
//!
//! Loaded the way `agenticlaw-consciousness::config` loads its TOML file:
//! `#[serde(default)]` throughout so a partial or missing file still
//! produces a usable config.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Command prefixes the RUN directive is allowed to execute. A command is
/// permitted if it starts with one of these strings (spec §6 "allow-listed
/// shell command prefix list").
pub fn default_allowed_commands() -> Vec<String> {
    [
        "python -m pytest",
        "pytest",
        "python -m unittest",
        "npm test",
        "npm install",
        "npm run",
        "yarn test",
        "yarn install",
        "cargo test",
        "cargo build",
        "cargo check",
        "go test",
        "go build",
        "git status",
        "git diff",
        "git log",
        "ls",
        "cat",
        "pip install",
        "pip list",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Provider/model id (e.g. `"anthropic/claude-opus-4-6"`), or the
    /// literal string `"console"` to use the interactive console provider.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Absent means: read `ANTHROPIC_API_KEY` from the environment, and if
    /// that's absent too, fall back to the console/mock client.
    pub api_key: Option<String>,
    pub allowed_commands: Vec<String>,
    /// Root of the project the agent tree operates on. Resolved to an
    /// absolute path by `resolve_project_root` before use.
    pub project_root: PathBuf,
    /// Wall-clock timeout for a single RUN invocation, in seconds.
    pub run_timeout_secs: u64,
    /// Wall-clock timeout for a tester's RUN invocation, in seconds.
    pub tester_run_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model: "console".to_string(),
            temperature: 0.2,
            max_tokens: 8192,
            api_key: None,
            allowed_commands: default_allowed_commands(),
            project_root: PathBuf::from("."),
            run_timeout_secs: 300,
            tester_run_timeout_secs: 120,
        }
    }
}

impl RuntimeConfig {
    /// Load from a TOML file, falling back to defaults for anything missing.
    /// Mirrors `ConsciousnessConfig::load`'s forgiving behavior: a malformed
    /// or absent file never aborts startup.
    pub fn load(path: &Path) -> crate::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Resolve `api_key`, falling back to `ANTHROPIC_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
    }

    /// True when no API key is available anywhere and the console/mock
    /// provider must be used instead of a real backend.
    pub fn uses_console_provider(&self) -> bool {
        self.model == "console" || self.resolve_api_key().is_none()
    }

    /// Checks whether `command`'s first token matches an allowed prefix.
    pub fn is_command_allowed(&self, command: &str) -> bool {
        self.allowed_commands
            .iter()
            .any(|prefix| command.starts_with(prefix.as_str()))
    }
}
