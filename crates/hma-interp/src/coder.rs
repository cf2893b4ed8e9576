//! Coder Language interpreter — every CHANGE/REPLACE/INSERT mutates exactly
//! the coder's own file, never anything else.

use crate::commands::run_command;
use crate::context::CoderContext;
use hma_core::{InterpreterError, RuntimeConfig};
use hma_lang::ast::{ReplaceItem, SpawnItem};
use hma_lang::CoderDirective;

pub enum CoderEffect {
    Spawn(Vec<SpawnItem>),
    Finish(String),
    NoOp,
    SelfPrompt(String),
}

#[tracing::instrument(skip_all, fields(own_file = %ctx.own_file.display()))]
pub async fn interpret(
    directive: &CoderDirective,
    ctx: &CoderContext,
    config: &RuntimeConfig,
) -> Result<CoderEffect, InterpreterError> {
    let result = match directive {
        CoderDirective::Read(filename) => execute_read(filename, ctx),
        CoderDirective::Run(command) => {
            run_command(command, &ctx.project_root, config, ctx.run_timeout_secs)
                .await
                .map(CoderEffect::SelfPrompt)
        }
        CoderDirective::Change(content) => execute_change(content, ctx),
        CoderDirective::Replace(items) => execute_replace(items, ctx),
        CoderDirective::Insert { from, to } => execute_insert(from, to, ctx),
        CoderDirective::Spawn(items) => execute_spawn(items),
        CoderDirective::Wait => execute_wait(ctx),
        CoderDirective::Finish(prompt) => execute_finish(prompt, ctx),
    };
    if let Err(e) = &result {
        tracing::warn!(error = %e, "coder directive rejected");
    }
    result
}

fn execute_read(filename: &str, ctx: &CoderContext) -> Result<CoderEffect, InterpreterError> {
    let path = ctx.project_root.join(filename);
    let message = if path.exists() {
        format!("READ succeeded: {} was added to memory for future reads", filename)
    } else {
        format!("READ failed: File not found: {}", filename)
    };
    Ok(CoderEffect::SelfPrompt(message))
}

fn execute_change(content: &str, ctx: &CoderContext) -> Result<CoderEffect, InterpreterError> {
    if let Some(parent) = ctx.own_file.parent() {
        std::fs::create_dir_all(parent).map_err(|e| InterpreterError::Filesystem(e.to_string()))?;
    }
    std::fs::write(&ctx.own_file, content).map_err(|e| InterpreterError::Filesystem(e.to_string()))?;
    Ok(CoderEffect::SelfPrompt(format!(
        "CHANGE succeeded: {} was replaced with new content",
        ctx.own_file.display()
    )))
}

fn execute_replace(items: &[ReplaceItem], ctx: &CoderContext) -> Result<CoderEffect, InterpreterError> {
    if !ctx.own_file.exists() {
        return Ok(CoderEffect::SelfPrompt(format!(
            "REPLACE failed: File not found: {}",
            ctx.own_file.display()
        )));
    }
    let current = std::fs::read_to_string(&ctx.own_file)
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
            ctx.own_file.display()
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
            ctx.own_file.display(),
            described
        )));
    }

    let mut new_content = current;
    let mut replaced = Vec::new();
    for item in items {
        new_content = new_content.replace(&item.from, &item.to);
        replaced.push(format!("'{}' -> '{}'", item.from, item.to));
    }
    std::fs::write(&ctx.own_file, new_content).map_err(|e| InterpreterError::Filesystem(e.to_string()))?;

    Ok(CoderEffect::SelfPrompt(format!(
        "REPLACE succeeded: Replaced {} item(s) in {}: {}",
        items.len(),
        ctx.own_file.display(),
        replaced.join(", ")
    )))
}

fn execute_insert(from: &str, to: &str, ctx: &CoderContext) -> Result<CoderEffect, InterpreterError> {
    if !ctx.own_file.exists() {
        return Ok(CoderEffect::SelfPrompt(format!(
            "INSERT failed: File not found: {}",
            ctx.own_file.display()
        )));
    }
    let current = std::fs::read_to_string(&ctx.own_file)
        .map_err(|e| InterpreterError::Filesystem(e.to_string()))?;

    let count = current.matches(from).count();
    if count == 0 {
        return Err(InterpreterError::MissingString(format!(
            "String '{}' not found in {}",
            from,
            ctx.own_file.display()
        )));
    }
    if count > 1 {
        return Err(InterpreterError::AmbiguousString(format!(
            "Ambiguous from string '{}' in {}: {} occurrences. Please be more specific to target a unique string.",
            from,
            ctx.own_file.display(),
            count
        )));
    }

    let replacement = format!("{}{}", from, to);
    let new_content = current.replace(from, &replacement);
    std::fs::write(&ctx.own_file, new_content).map_err(|e| InterpreterError::Filesystem(e.to_string()))?;

    Ok(CoderEffect::SelfPrompt(format!(
        "INSERT succeeded: Inserted '{}' after '{}' in {}",
        to,
        from,
        ctx.own_file.display()
    )))
}

fn execute_spawn(items: &[SpawnItem]) -> Result<CoderEffect, InterpreterError> {
    if items.is_empty() {
        return Err(InterpreterError::UnknownEphemeralType("none given".to_string()));
    }
    Ok(CoderEffect::Spawn(items.to_vec()))
}

fn execute_wait(ctx: &CoderContext) -> Result<CoderEffect, InterpreterError> {
    if ctx.has_active_ephemeral {
        Ok(CoderEffect::NoOp)
    } else {
        Err(InterpreterError::NothingToWaitFor)
    }
}

fn execute_finish(prompt: &str, ctx: &CoderContext) -> Result<CoderEffect, InterpreterError> {
    if ctx.active_ephemeral_count > 0 {
        return Err(InterpreterError::ActiveEphemeralAgents(ctx.active_ephemeral_count));
    }
    Ok(CoderEffect::Finish(prompt.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hma_core::RuntimeConfig;
    use tempfile::tempdir;

    fn ctx(own_file: std::path::PathBuf, project_root: std::path::PathBuf) -> CoderContext {
        CoderContext {
            own_file,
            project_root,
            has_active_ephemeral: false,
            active_ephemeral_count: 0,
            run_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn replace_detects_ambiguous_match() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("lib.rs");
        std::fs::write(&file, "foo foo bar").unwrap();
        let c = ctx(file, dir.path().to_path_buf());
        let directive = CoderDirective::Replace(vec![ReplaceItem {
            from: "foo".to_string(),
            to: "baz".to_string(),
        }]);
        let cfg = RuntimeConfig::default();
        let result = interpret(&directive, &c, &cfg).await;
        assert!(matches!(result, Err(InterpreterError::AmbiguousString(_))));
    }

    #[tokio::test]
    async fn replace_detects_missing_string() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("lib.rs");
        std::fs::write(&file, "bar").unwrap();
        let c = ctx(file, dir.path().to_path_buf());
        let directive = CoderDirective::Replace(vec![ReplaceItem {
            from: "foo".to_string(),
            to: "baz".to_string(),
        }]);
        let cfg = RuntimeConfig::default();
        let result = interpret(&directive, &c, &cfg).await;
        assert!(matches!(result, Err(InterpreterError::MissingString(_))));
    }

    #[tokio::test]
    async fn change_writes_own_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("lib.rs");
        let c = ctx(file.clone(), dir.path().to_path_buf());
        let directive = CoderDirective::Change("fn main() {}".to_string());
        let cfg = RuntimeConfig::default();
        interpret(&directive, &c, &cfg).await.unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "fn main() {}");
    }
}
