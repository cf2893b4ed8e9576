//! Tester Language interpreter. Testers are ephemeral and own no file in the
//! tree — CHANGE writes to a private scratch file instead.

use crate::commands::run_command;
use crate::context::TesterContext;
use hma_core::{InterpreterError, RuntimeConfig};
use hma_lang::ast::ReplaceItem;
use hma_lang::TesterDirective;

pub enum TesterEffect {
    Finish(String),
    SelfPrompt(String),
}

#[tracing::instrument(skip_all, fields(scratch_file = %ctx.scratch_file.display()))]
pub async fn interpret(
    directive: &TesterDirective,
    ctx: &TesterContext,
    config: &RuntimeConfig,
) -> Result<TesterEffect, InterpreterError> {
    let result = match directive {
        TesterDirective::Read(filename) => execute_read(filename, ctx),
        TesterDirective::Run(command) => {
            run_command(command, &ctx.project_root, config, ctx.run_timeout_secs)
                .await
                .map(TesterEffect::SelfPrompt)
        }
        TesterDirective::Change(content) => execute_change(content, ctx),
        TesterDirective::Replace(items) => execute_replace(items, ctx),
        TesterDirective::Finish(prompt) => Ok(TesterEffect::Finish(prompt.to_string())),
    };
    if let Err(e) = &result {
        tracing::warn!(error = %e, "tester directive rejected");
    }
    result
}

fn execute_read(filename: &str, ctx: &TesterContext) -> Result<TesterEffect, InterpreterError> {
    let path = ctx.project_root.join(filename);
    let message = if path.exists() {
        format!("READ succeeded: {} was added to memory for future reads", filename)
    } else {
        format!("READ failed: File not found: {}", filename)
    };
    Ok(TesterEffect::SelfPrompt(message))
}

fn execute_change(content: &str, ctx: &TesterContext) -> Result<TesterEffect, InterpreterError> {
    if let Some(parent) = ctx.scratch_file.parent() {
        std::fs::create_dir_all(parent).map_err(|e| InterpreterError::Filesystem(e.to_string()))?;
    }
    std::fs::write(&ctx.scratch_file, content).map_err(|e| InterpreterError::Filesystem(e.to_string()))?;
    Ok(TesterEffect::SelfPrompt(
        "CHANGE succeeded: scratch pad updated".to_string(),
    ))
}

fn execute_replace(items: &[ReplaceItem], ctx: &TesterContext) -> Result<TesterEffect, InterpreterError> {
    if !ctx.scratch_file.exists() {
        return Ok(TesterEffect::SelfPrompt(format!(
            "REPLACE failed: File not found: {}",
            ctx.scratch_file.display()
        )));
    }
    let current = std::fs::read_to_string(&ctx.scratch_file)
        .map_err(|e| InterpreterError::Filesystem(e.to_string()))?;

    let mut missing = Vec::new();
    let mut ambiguous = Vec::new();
    for item in items {
        let count = current.matches(item.from.as_str()).count();
        if count == 0 {
            missing.push(item.from.clone());
        } else if count > 1 {
            ambiguous.push((item.from.clone(), count));
        }
    }

    if !missing.is_empty() {
        return Err(InterpreterError::MissingString(format!(
            "String(s) '{}' not found in {}",
            missing.join("', '"),
            ctx.scratch_file.display()
        )));
    }
    if !ambiguous.is_empty() {
        let described = ambiguous
            .iter()
            .map(|(s, c)| format!("'{}' ({} occurrences)", s, c))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(InterpreterError::AmbiguousString(format!(
            "Ambiguous from strings in {}: {}. Please be more specific to target unique strings.",
            ctx.scratch_file.display(),
            described
        )));
    }

    let mut new_content = current;
    let mut replaced = Vec::new();
    for item in items {
        new_content = new_content.replace(&item.from, &item.to);
        replaced.push(format!("'{}' -> '{}'", item.from, item.to));
    }
    std::fs::write(&ctx.scratch_file, new_content).map_err(|e| InterpreterError::Filesystem(e.to_string()))?;

    Ok(TesterEffect::SelfPrompt(format!(
        "REPLACE succeeded: Replaced {} item(s) in {}: {}",
        items.len(),
        ctx.scratch_file.display(),
        replaced.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hma_core::RuntimeConfig;
    use tempfile::tempdir;

    #[tokio::test]
    async fn replace_detects_ambiguous_match() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("scratch.md");
        std::fs::write(&file, "foo foo bar").unwrap();
        let ctx = TesterContext {
            scratch_file: file,
            project_root: dir.path().to_path_buf(),
            run_timeout_secs: 5,
        };
        let cfg = RuntimeConfig::default();
        let directive = TesterDirective::Replace(vec![ReplaceItem {
            from: "foo".to_string(),
            to: "baz".to_string(),
        }]);
        let result = interpret(&directive, &ctx, &cfg).await;
        assert!(matches!(result, Err(InterpreterError::AmbiguousString(_))));
    }

    #[tokio::test]
    async fn finish_carries_prompt_through() {
        let dir = tempdir().unwrap();
        let ctx = TesterContext {
            scratch_file: dir.path().join("scratch.md"),
            project_root: dir.path().to_path_buf(),
            run_timeout_secs: 5,
        };
        let cfg = RuntimeConfig::default();
        let directive = TesterDirective::Finish("2 passed".to_string());
        match interpret(&directive, &ctx, &cfg).await.unwrap() {
            TesterEffect::Finish(prompt) => assert_eq!(prompt, "2 passed"),
            _ => panic!("expected Finish"),
        }
    }
}
