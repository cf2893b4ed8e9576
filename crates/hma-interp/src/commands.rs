//! RUN directive execution: command allow-listing plus a watchdog timeout.
//!
//! A disallowed command or a timeout is an `InterpreterError` like any other
//! directive failure, recovered through the same self-prompt path. A
//! completed run (success or nonzero exit) isn't an error at all — it's a
//! reportable result, so it comes back as `Ok(text)`.

use hma_core::{InterpreterError, RuntimeConfig};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

const MAX_OUTPUT_CHARS: usize = 100_000;

pub async fn run_command(
    command: &str,
    cwd: &Path,
    config: &RuntimeConfig,
    timeout_secs: u64,
) -> Result<String, InterpreterError> {
    if !config.is_command_allowed(command) {
        return Err(InterpreterError::InvalidCommand(command.to_string()));
    }

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .kill_on_drop(true)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .map_err(|e| InterpreterError::Filesystem(format!("Failed to execute command '{}': {}", command, e)))?;

    let timeout_duration = Duration::from_secs(timeout_secs);
    let output = match tokio::time::timeout(timeout_duration, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(InterpreterError::Filesystem(format!(
                "Failed to execute command '{}': {}",
                command, e
            )))
        }
        Err(_) => {
            // wait_with_output() already took ownership of `child`, so there's
            // nothing left to kill here — kill_on_drop(true) on the spawn
            // above means the timed-out future's drop kills the process
            // group instead of leaving it orphaned in the background.
            return Err(InterpreterError::CommandTimeout(timeout_secs, command.to_string()));
        }
    };

    let stdout = clip(String::from_utf8_lossy(&output.stdout).trim());
    let stderr = clip(String::from_utf8_lossy(&output.stderr).trim());

    Ok(if output.status.success() {
        format!("RUN succeeded: Output:\n{}", stdout)
    } else if !stderr.is_empty() {
        format!("RUN failed: Output:\n{}\nError:\n{}", stdout, stderr)
    } else {
        format!(
            "RUN failed: Output:\n{}\nError:\nexited with code {}",
            stdout,
            output.status.code().unwrap_or(-1)
        )
    })
}

/// Clips to at most `MAX_OUTPUT_CHARS`, marking the cut so the LLM knows the
/// tail was dropped rather than mistaking it for the whole output.
fn clip(s: &str) -> String {
    if s.chars().count() <= MAX_OUTPUT_CHARS {
        return s.to_string();
    }
    let truncated: String = s.chars().take(MAX_OUTPUT_CHARS).collect();
    format!("{}\n... [truncated, {} total chars]", truncated, s.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config_allowing(prefix: &str) -> RuntimeConfig {
        RuntimeConfig {
            allowed_commands: vec![prefix.to_string()],
            ..RuntimeConfig::default()
        }
    }

    #[tokio::test]
    async fn rejects_disallowed_command() {
        let cfg = config_allowing("cargo test");
        let result = run_command("rm -rf /", &PathBuf::from("."), &cfg, 5).await;
        assert!(matches!(result, Err(InterpreterError::InvalidCommand(_))));
    }

    #[tokio::test]
    async fn runs_allowed_command() {
        let cfg = config_allowing("echo");
        let result = run_command("echo hello", &PathBuf::from("."), &cfg, 5).await.unwrap();
        assert_eq!(result, "RUN succeeded: Output:\nhello");
    }

    #[tokio::test]
    async fn reports_nonzero_exit() {
        let cfg = config_allowing("false");
        let result = run_command("false", &PathBuf::from("."), &cfg, 5).await.unwrap();
        assert!(result.starts_with("RUN failed"));
    }

    #[tokio::test]
    async fn kills_process_on_timeout() {
        let cfg = config_allowing("sleep");
        let result = run_command("sleep 5", &PathBuf::from("."), &cfg, 1).await;
        assert!(matches!(result, Err(InterpreterError::CommandTimeout(1, _))));
    }

    #[tokio::test]
    async fn clips_oversized_output() {
        let cfg = config_allowing("yes");
        let result = run_command("yes x | head -c 200000", &PathBuf::from("."), &cfg, 5)
            .await
            .unwrap();
        assert!(result.contains("truncated"));
    }
}
