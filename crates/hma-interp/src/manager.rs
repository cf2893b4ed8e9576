//! Manager Language interpreter. Master agents run through the same
//! `interpret` function with `ManagerContext::is_master` set — CREATE/DELETE
//! scope simply widens to the whole project root instead of a subdirectory.

use crate::commands::run_command;
use crate::context::ManagerContext;
use crate::fs_ops;
use hma_core::{InterpreterError, RuntimeConfig};
use hma_lang::ast::{DelegateItem, SpawnItem, Target};
use hma_lang::ManagerDirective;
use std::path::PathBuf;

/// What the interpreter decided should happen. The caller (the agent's
/// orchestrator) turns `Delegate`/`Spawn`/`Finish` into agent-tree
/// operations; everything else is a plain follow-up prompt for the agent
/// itself.
pub enum ManagerEffect {
    Delegate(Vec<DelegateItem>),
    Spawn(Vec<SpawnItem>),
    Finish(String),
    /// WAIT with active children/ephemeral agents: genuinely do nothing and
    /// let the prompt loop resume when they complete.
    NoOp,
    /// Targets actually created, plus the combined per-target result prompt.
    Created(Vec<Target>, String),
    /// Targets actually deleted, plus the combined per-target result prompt.
    Deleted(Vec<Target>, String),
    SelfPrompt(String),
}

#[tracing::instrument(skip_all, fields(scope_dir = %ctx.scope_dir.display(), is_master = ctx.is_master))]
pub async fn interpret(
    directive: &ManagerDirective,
    ctx: &ManagerContext<'_>,
    config: &RuntimeConfig,
) -> Result<ManagerEffect, InterpreterError> {
    let result = match directive {
        ManagerDirective::Delegate(items) => execute_delegate(items, ctx),
        ManagerDirective::Spawn(items) => execute_spawn(items),
        ManagerDirective::Finish(prompt) => execute_finish(prompt, ctx),
        ManagerDirective::Wait => execute_wait(ctx),
        ManagerDirective::Create(targets) => execute_create(targets, ctx),
        ManagerDirective::Delete(targets) => execute_delete(targets, ctx),
        ManagerDirective::Read(targets) => execute_read(targets, ctx),
        ManagerDirective::Run(command) => {
            run_command(command, &ctx.scope_dir, config, ctx.run_timeout_secs)
                .await
                .map(ManagerEffect::SelfPrompt)
        }
        ManagerDirective::UpdateReadme(content) => execute_update_readme(content, ctx),
    };
    if let Err(e) = &result {
        tracing::warn!(error = %e, "manager directive rejected");
    }
    result
}

fn child_exists(children: &[crate::context::ChildInfo], path: &PathBuf) -> Option<&crate::context::ChildInfo> {
    children.iter().find(|c| &c.path == path)
}

fn execute_delegate(
    items: &[DelegateItem],
    ctx: &ManagerContext,
) -> Result<ManagerEffect, InterpreterError> {
    let mut missing = Vec::new();
    for item in items {
        let target_path = ctx.project_root.join(&item.target.name);
        if child_exists(ctx.children, &target_path).is_none() {
            missing.push(item.target.name.clone());
        }
    }

    if !missing.is_empty() {
        missing.sort();
        return Err(InterpreterError::ScopeError(format!(
            "DELEGATE failed: The following targets are not within this manager's scope – {}",
            missing.join(", ")
        )));
    }

    Ok(ManagerEffect::Delegate(items.to_vec()))
}

fn execute_spawn(items: &[SpawnItem]) -> Result<ManagerEffect, InterpreterError> {
    if items.is_empty() {
        return Err(InterpreterError::UnknownEphemeralType("none given".to_string()));
    }
    Ok(ManagerEffect::Spawn(items.to_vec()))
}

fn execute_finish(prompt: &str, ctx: &ManagerContext) -> Result<ManagerEffect, InterpreterError> {
    if ctx.active_children_count > 0 {
        return Err(InterpreterError::ActiveChildren(ctx.active_children_count));
    }
    if ctx.active_ephemeral_count > 0 {
        return Err(InterpreterError::ActiveEphemeralAgents(ctx.active_ephemeral_count));
    }
    // The root Master has no parent to report a `ResultMessage` to; its
    // FINISH instead stores a user-visible `final_result` (handled by the
    // caller, which has access to the live agent tree this crate doesn't).
    Ok(ManagerEffect::Finish(prompt.to_string()))
}

fn execute_wait(ctx: &ManagerContext) -> Result<ManagerEffect, InterpreterError> {
    if ctx.active_children_count > 0 || ctx.active_ephemeral_count > 0 {
        Ok(ManagerEffect::NoOp)
    } else {
        Err(InterpreterError::NothingToWaitFor)
    }
}

fn execute_create(
    targets: &[Target],
    ctx: &ManagerContext,
) -> Result<ManagerEffect, InterpreterError> {
    if targets.is_empty() {
        return Err(InterpreterError::ParseError("CREATE requires a target".to_string()));
    }

    let mut created = Vec::new();
    let mut messages = Vec::new();
    for target in targets {
        let kind = if target.is_folder { "folder" } else { "file" };
        let message = match fs_ops::resolve_in_scope(&ctx.scope_dir, &ctx.project_root, &target.name) {
            Err(e) => format!("Failed to create {} {}: {}", kind, target.name, e),
            Ok(resolved) if resolved.exists() => {
                format!("Failed to create {} {}: already exists", kind, target.name)
            }
            Ok(resolved) => {
                let result = if target.is_folder {
                    fs_ops::create_folder(&resolved)
                } else {
                    fs_ops::create_file(&resolved)
                };
                match result {
                    Ok(()) => {
                        created.push(target.clone());
                        format!("Created {} {}", kind, target.name)
                    }
                    Err(e) => format!("Failed to create {} {}: {}", kind, target.name, e),
                }
            }
        };
        messages.push(message);
    }

    Ok(ManagerEffect::Created(
        created,
        format!("Action CREATE completed:\n{}", messages.join("\n")),
    ))
}

fn execute_delete(
    targets: &[Target],
    ctx: &ManagerContext,
) -> Result<ManagerEffect, InterpreterError> {
    if targets.is_empty() {
        return Err(InterpreterError::ParseError("DELETE requires a target".to_string()));
    }

    let mut deleted = Vec::new();
    let mut messages = Vec::new();
    for target in targets {
        let kind = if target.is_folder { "folder" } else { "file" };
        let message = match fs_ops::resolve_in_scope(&ctx.scope_dir, &ctx.project_root, &target.name) {
            Err(e) => format!("Failed to delete {} {}: {}", kind, target.name, e),
            Ok(resolved) => {
                if let Some(child) = child_exists(ctx.children, &resolved) {
                    if child.is_active {
                        messages.push(format!(
                            "Failed to delete {} {}: agent is currently active",
                            kind, target.name
                        ));
                        continue;
                    }
                }
                if !resolved.exists() {
                    format!("Failed to delete {} {}: does not exist", kind, target.name)
                } else {
                    let result = if target.is_folder {
                        fs_ops::delete_folder(&resolved)
                    } else {
                        fs_ops::delete_file(&resolved)
                    };
                    match result {
                        Ok(()) => {
                            deleted.push(target.clone());
                            format!("Deleted {} {}", kind, target.name)
                        }
                        Err(e) => format!("Failed to delete {} {}: {}", kind, target.name, e),
                    }
                }
            }
        };
        messages.push(message);
    }

    Ok(ManagerEffect::Deleted(
        deleted,
        format!("Action DELETE completed:\n{}", messages.join("\n")),
    ))
}

fn execute_read(targets: &[Target], ctx: &ManagerContext) -> Result<ManagerEffect, InterpreterError> {
    let mut messages = Vec::new();
    for target in targets {
        let path = ctx.project_root.join(&target.name);
        let message = if target.is_folder {
            if !path.is_dir() {
                format!("Folder {} was not added to memory: folder not found", target.name)
            } else {
                let readme = fs_ops::readme_path_for(&path);
                if readme.exists() {
                    format!("Folder {} README was added to memory", target.name)
                } else {
                    format!("Folder {} has no README file to add to memory", target.name)
                }
            }
        } else if path.is_file() {
            format!("File {} was added to memory", target.name)
        } else {
            format!("File {} was not added to memory: file not found", target.name)
        };
        messages.push(message);
    }
    Ok(ManagerEffect::SelfPrompt(format!(
        "Action READ completed:\n{}",
        messages.join("\n")
    )))
}

fn execute_update_readme(content: &str, ctx: &ManagerContext) -> Result<ManagerEffect, InterpreterError> {
    let readme_path = fs_ops::readme_path_for(&ctx.scope_dir);
    let result = std::fs::write(&readme_path, content)
        .map(|_| format!("Successfully updated {}", readme_path.display()))
        .unwrap_or_else(|e| format!("Failed to update readme: {}", e));
    Ok(ManagerEffect::SelfPrompt(format!(
        "Update README result:\n{}",
        result
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ChildInfo;
    use hma_core::RuntimeConfig;
    use tempfile::tempdir;

    fn ctx<'a>(scope: PathBuf, root: PathBuf, children: &'a [ChildInfo]) -> ManagerContext<'a> {
        ManagerContext {
            scope_dir: scope,
            project_root: root,
            is_master: false,
            children,
            active_children_count: 0,
            active_ephemeral_count: 0,
            run_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn delegate_rejects_out_of_scope_target() {
        let dir = tempdir().unwrap();
        let children = vec![];
        let c = ctx(dir.path().to_path_buf(), dir.path().to_path_buf(), &children);
        let directive = ManagerDirective::Delegate(vec![DelegateItem {
            target: Target::file("nope.rs"),
            prompt: "do it".to_string(),
        }]);
        let cfg = RuntimeConfig::default();
        let result = interpret(&directive, &c, &cfg).await;
        assert!(matches!(result, Err(InterpreterError::ScopeError(_))));
    }

    #[tokio::test]
    async fn create_file_succeeds_within_scope() {
        let dir = tempdir().unwrap();
        let children = vec![];
        let c = ctx(dir.path().to_path_buf(), dir.path().to_path_buf(), &children);
        let directive = ManagerDirective::Create(vec![Target::file("new.rs")]);
        let cfg = RuntimeConfig::default();
        let result = interpret(&directive, &c, &cfg).await.unwrap();
        match result {
            ManagerEffect::Created(created, _) => assert_eq!(created.len(), 1),
            _ => panic!("expected Created"),
        }
        assert!(dir.path().join("new.rs").exists());
    }

    #[tokio::test]
    async fn create_reports_every_target_not_just_the_first() {
        let dir = tempdir().unwrap();
        let children = vec![];
        let c = ctx(dir.path().to_path_buf(), dir.path().to_path_buf(), &children);
        let directive = ManagerDirective::Create(vec![Target::file("a.rs"), Target::folder("b")]);
        let cfg = RuntimeConfig::default();
        let result = interpret(&directive, &c, &cfg).await.unwrap();
        match result {
            ManagerEffect::Created(created, message) => {
                assert_eq!(created.len(), 2);
                assert!(message.contains("a.rs"));
                assert!(message.contains("b"));
            }
            _ => panic!("expected Created"),
        }
        assert!(dir.path().join("a.rs").is_file());
        assert!(dir.path().join("b").is_dir());
    }

    #[tokio::test]
    async fn finish_rejected_with_active_ephemeral_agents() {
        let dir = tempdir().unwrap();
        let children = vec![];
        let mut c = ctx(dir.path().to_path_buf(), dir.path().to_path_buf(), &children);
        c.active_ephemeral_count = 2;
        let directive = ManagerDirective::Finish("done".to_string());
        let cfg = RuntimeConfig::default();
        let result = interpret(&directive, &c, &cfg).await;
        assert!(matches!(result, Err(InterpreterError::ActiveEphemeralAgents(2))));
    }
}
