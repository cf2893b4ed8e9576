//! The prompter loop: the only place that calls into an LLM provider.
//!
//! Each `*_prompter` enforces "exactly one `generate_response` call in
//! flight per agent" via `AgentCore::try_claim`. A prompt that arrives while
//! the agent is already mid-call is queued, not dropped; the caller that
//! currently holds the claim drains the queue in a loop until it's empty,
//! so no second task ever needs to wait for the lock across an `.await`.

use crate::agent::{AgentNode, ResultMessage, TaskMessage};
use hma_core::{InterpreterError, Message, RuntimeConfig, Task};
use hma_interp::context::{ChildInfo, CoderContext, ManagerContext, TesterContext};
use hma_interp::{coder, manager, tester, CoderEffect, ManagerEffect, TesterEffect};
use hma_lang::ast::{DelegateItem, SpawnItem, Target};
use hma_llm::LlmProvider;
use std::sync::Arc;
use tracing::{info, instrument, warn};

const SYSTEM_PREAMBLE_MANAGER: &str =
    "You are a Manager agent responsible for a directory. Reply with exactly one directive per turn.";
const SYSTEM_PREAMBLE_CODER: &str =
    "You are a Coder agent responsible for a single file. Reply with exactly one directive per turn.";
const SYSTEM_PREAMBLE_TESTER: &str =
    "You are an ephemeral Tester agent. Reply with exactly one directive per turn.";

/// Root entry point. Master speaks the same grammar as Manager (spec Design
/// Notes), so this is a thin, descriptively-named wrapper.
pub async fn master_prompter(
    agent: Arc<AgentNode>,
    prompt: String,
    llm: Arc<dyn LlmProvider>,
    config: Arc<RuntimeConfig>,
) {
    manager_prompter(agent, prompt, llm, config).await
}

#[instrument(skip(agent, llm, config), fields(path = %agent.path().display()))]
pub async fn manager_prompter(
    agent: Arc<AgentNode>,
    prompt: String,
    llm: Arc<dyn LlmProvider>,
    config: Arc<RuntimeConfig>,
) {
    let core = agent.core();
    core.queue_prompt(prompt).await;
    if !core.try_claim() {
        return;
    }

    loop {
        let queued = core.drain_queue().await;
        if queued.is_empty() {
            core.release();
            return;
        }
        let combined = queued.join("\n");
        core.remember(Message::user(combined.clone())).await;

        if !core.is_active() {
            core.release();
            return;
        }

        let history = core.history().await;
        let response = match llm
            .generate_response(&history, config.temperature, config.max_tokens)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "manager LLM call failed");
                core.queue_prompt(format!("LLM call failed: {}", e)).await;
                continue;
            }
        };
        core.remember(Message::assistant(response.clone())).await;

        let directive = match hma_lang::parse_manager_directive(&response) {
            Ok(d) => d,
            Err(e) => {
                core.queue_prompt(InterpreterError::ParseError(e.to_string()).recovery_prompt())
                    .await;
                continue;
            }
        };

        let manager = match agent.as_manager() {
            Some(m) => m,
            None => return,
        };

        let children = {
            let guard = manager.children.read().await;
            guard
                .iter()
                .map(|c| ChildInfo { path: c.path().to_path_buf(), is_active: c.core().is_active() })
                .collect::<Vec<_>>()
        };
        let ctx = ManagerContext {
            scope_dir: manager.path.clone(),
            project_root: config.project_root.clone(),
            is_master: manager.is_master,
            children: &children,
            active_children_count: manager.active_children.len(),
            active_ephemeral_count: manager.active_ephemeral.len(),
            run_timeout_secs: config.run_timeout_secs,
        };

        match manager::interpret(&directive, &ctx, &config).await {
            Err(e) => {
                if e.is_locally_recoverable() {
                    core.queue_prompt(e.recovery_prompt()).await;
                    continue;
                } else {
                    warn!(error = %e, "manager directive raised a non-recoverable error");
                    core.release();
                    return;
                }
            }
            Ok(ManagerEffect::Delegate(items)) => {
                delegate(&agent, manager, items, llm.clone(), config.clone()).await;
            }
            Ok(ManagerEffect::Spawn(items)) => {
                spawn_testers(&agent, manager, items, llm.clone(), config.clone()).await;
            }
            Ok(ManagerEffect::Finish(result)) => {
                finish(&agent, result, llm.clone(), config.clone()).await;
                core.release();
                return;
            }
            Ok(ManagerEffect::NoOp) => {}
            Ok(ManagerEffect::Created(targets, message)) => {
                for target in &targets {
                    create_child(&agent, manager, target, &config).await;
                }
                core.queue_prompt(message).await;
            }
            Ok(ManagerEffect::Deleted(targets, message)) => {
                for target in &targets {
                    remove_child(manager, target, &config).await;
                }
                core.queue_prompt(message).await;
            }
            Ok(ManagerEffect::SelfPrompt(message)) => {
                core.queue_prompt(message).await;
            }
        }
    }
}

async fn delegate(
    agent: &Arc<AgentNode>,
    manager: &crate::agent::ManagerAgent,
    items: Vec<DelegateItem>,
    llm: Arc<dyn LlmProvider>,
    config: Arc<RuntimeConfig>,
) {
    let children = manager.children.read().await;
    for item in items {
        let target_path = config.project_root.join(&item.target.name);
        let Some(child) = children.iter().find(|c| c.path() == target_path).cloned() else {
            continue;
        };
        let task = Task::new(item.prompt.clone());
        let message = TaskMessage::new(agent, &child, task.clone());
        child.core().set_active_task(Some(task)).await;
        child.core().activate();
        manager.active_children.insert(target_path, ());
        info!(message_id = %message.message_id, target = %item.target.name, "delegating");

        let llm = llm.clone();
        let config = config.clone();
        match &*child {
            AgentNode::Manager(_) => {
                tokio::spawn(manager_prompter(child, item.prompt, llm, config));
            }
            AgentNode::Coder(_) => {
                tokio::spawn(coder_prompter(child, item.prompt, llm, config));
            }
            AgentNode::Tester(_) => {}
        }
    }
}

async fn spawn_testers(
    agent: &Arc<AgentNode>,
    manager: &crate::agent::ManagerAgent,
    items: Vec<SpawnItem>,
    llm: Arc<dyn LlmProvider>,
    config: Arc<RuntimeConfig>,
) {
    for item in items {
        let ephemeral_id = uuid::Uuid::new_v4().to_string();
        manager.active_ephemeral.insert(ephemeral_id.clone(), ());
        let tester = AgentNode::new_tester(
            config.project_root.join(format!(".hma/tester-{}.scratch", ephemeral_id)),
            agent,
        );
        tokio::spawn(tester_spawner(
            agent.clone(),
            ephemeral_id,
            tester,
            item.prompt,
            llm.clone(),
            config.clone(),
        ));
    }
}

async fn create_child(
    agent: &Arc<AgentNode>,
    manager: &crate::agent::ManagerAgent,
    target: &Target,
    config: &RuntimeConfig,
) {
    let resolved = config.project_root.join(&target.name);
    let child = if target.is_folder {
        AgentNode::new_manager(resolved, agent)
    } else {
        AgentNode::new_coder(resolved, agent)
    };
    manager.children.write().await.push(child);
}

async fn remove_child(manager: &crate::agent::ManagerAgent, target: &Target, config: &RuntimeConfig) {
    let resolved = config.project_root.join(&target.name);
    manager.children.write().await.retain(|c| c.path() != resolved);
}

/// Deactivates `agent`, builds the `ResultMessage` for its parent, and
/// re-enters the parent's prompter — queuing alone wouldn't be enough if the
/// parent had already released its single-flight claim while waiting. The
/// root Master has no parent to report to; its result is stored as
/// `final_result` instead, which is what makes the run's output visible.
async fn finish(
    agent: &Arc<AgentNode>,
    result: String,
    llm: Arc<dyn LlmProvider>,
    config: Arc<RuntimeConfig>,
) {
    agent.core().deactivate();
    let Some(parent) = agent.parent() else {
        agent.core().set_final_result(result).await;
        return;
    };
    if let AgentNode::Manager(parent_manager) = &*parent {
        parent_manager.active_children.remove(agent.path());
    }
    let task = agent
        .core()
        .active_task()
        .await
        .unwrap_or_else(|| Task::new("Task finished"));
    let _message = ResultMessage::new(agent, &parent, task, result.clone());
    let child_name = agent
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| agent.path().display().to_string());
    let prompt = format!("[{}] {}", child_name, result);

    match &*parent {
        AgentNode::Manager(_) => {
            tokio::spawn(manager_prompter(parent, prompt, llm, config));
        }
        AgentNode::Coder(_) => {
            tokio::spawn(coder_prompter(parent, prompt, llm, config));
        }
        AgentNode::Tester(_) => {}
    }
}

#[instrument(skip(agent, llm, config), fields(path = %agent.path().display()))]
pub async fn coder_prompter(
    agent: Arc<AgentNode>,
    prompt: String,
    llm: Arc<dyn LlmProvider>,
    config: Arc<RuntimeConfig>,
) {
    let core = agent.core();
    core.queue_prompt(prompt).await;
    if !core.try_claim() {
        return;
    }

    loop {
        let queued = core.drain_queue().await;
        if queued.is_empty() {
            core.release();
            return;
        }
        let combined = queued.join("\n");
        core.remember(Message::user(combined)).await;

        if !core.is_active() {
            core.release();
            return;
        }

        let history = core.history().await;
        let response = match llm
            .generate_response(&history, config.temperature, config.max_tokens)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                core.queue_prompt(format!("LLM call failed: {}", e)).await;
                continue;
            }
        };
        core.remember(Message::assistant(response.clone())).await;

        let directive = match hma_lang::parse_coder_directive(&response) {
            Ok(d) => d,
            Err(e) => {
                core.queue_prompt(InterpreterError::ParseError(e.to_string()).recovery_prompt())
                    .await;
                continue;
            }
        };

        let coder = match agent.as_coder() {
            Some(c) => c,
            None => return,
        };

        let ctx = CoderContext {
            own_file: coder.own_file.clone(),
            project_root: config.project_root.clone(),
            has_active_ephemeral: !coder.active_ephemeral.is_empty(),
            active_ephemeral_count: coder.active_ephemeral.len(),
            run_timeout_secs: config.run_timeout_secs,
        };

        match coder::interpret(&directive, &ctx, &config).await {
            Err(e) => {
                if e.is_locally_recoverable() {
                    core.queue_prompt(e.recovery_prompt()).await;
                    continue;
                } else {
                    core.release();
                    return;
                }
            }
            Ok(CoderEffect::Spawn(items)) => {
                spawn_testers_from_coder(&agent, coder, items, llm.clone(), config.clone()).await;
            }
            Ok(CoderEffect::Finish(result)) => {
                finish(&agent, result, llm.clone(), config.clone()).await;
                core.release();
                return;
            }
            Ok(CoderEffect::NoOp) => {}
            Ok(CoderEffect::SelfPrompt(message)) => {
                core.queue_prompt(message).await;
            }
        }
    }
}

async fn spawn_testers_from_coder(
    agent: &Arc<AgentNode>,
    coder: &crate::agent::CoderAgent,
    items: Vec<SpawnItem>,
    llm: Arc<dyn LlmProvider>,
    config: Arc<RuntimeConfig>,
) {
    for item in items {
        let ephemeral_id = uuid::Uuid::new_v4().to_string();
        coder.active_ephemeral.insert(ephemeral_id.clone(), ());
        let tester = AgentNode::new_tester(
            config.project_root.join(format!(".hma/tester-{}.scratch", ephemeral_id)),
            agent,
        );
        tokio::spawn(tester_spawner(
            agent.clone(),
            ephemeral_id,
            tester,
            item.prompt,
            llm.clone(),
            config.clone(),
        ));
    }
}

/// Drives an ephemeral Tester to FINISH, then removes it from whichever
/// parent spawned it and wakes that parent with the result.
pub async fn tester_spawner(
    parent: Arc<AgentNode>,
    ephemeral_id: String,
    tester: Arc<AgentNode>,
    initial_prompt: String,
    llm: Arc<dyn LlmProvider>,
    config: Arc<RuntimeConfig>,
) {
    let core = tester.core();
    core.remember(Message::system(SYSTEM_PREAMBLE_TESTER)).await;
    core.queue_prompt(initial_prompt).await;

    let result = loop {
        let queued = core.drain_queue().await;
        if queued.is_empty() {
            break "Tester produced no result".to_string();
        }
        core.remember(Message::user(queued.join("\n"))).await;
        let history = core.history().await;

        let response = match llm
            .generate_response(&history, config.temperature, config.max_tokens)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                core.queue_prompt(format!("LLM call failed: {}", e)).await;
                continue;
            }
        };
        core.remember(Message::assistant(response.clone())).await;

        let directive = match hma_lang::parse_tester_directive(&response) {
            Ok(d) => d,
            Err(e) => {
                core.queue_prompt(InterpreterError::ParseError(e.to_string()).recovery_prompt())
                    .await;
                continue;
            }
        };

        let tester_agent = match tester.as_tester() {
            Some(t) => t,
            None => break "Tester lost its own node".to_string(),
        };
        let ctx = TesterContext {
            scratch_file: tester_agent.scratch_file.clone(),
            project_root: config.project_root.clone(),
            run_timeout_secs: config.tester_run_timeout_secs,
        };

        match tester::interpret(&directive, &ctx, &config).await {
            Err(e) => {
                core.queue_prompt(e.recovery_prompt()).await;
            }
            Ok(TesterEffect::Finish(result)) => break result,
            Ok(TesterEffect::SelfPrompt(message)) => {
                core.queue_prompt(message).await;
            }
        }
    };

    remove_ephemeral(&parent, &ephemeral_id).await;

    let prompt = format!("Ephemeral tester finished: {}", result);
    match &*parent {
        AgentNode::Manager(_) => manager_prompter(parent, prompt, llm, config).await,
        AgentNode::Coder(_) => coder_prompter(parent, prompt, llm, config).await,
        AgentNode::Tester(_) => {}
    }
}

async fn remove_ephemeral(parent: &Arc<AgentNode>, ephemeral_id: &str) {
    match &**parent {
        AgentNode::Manager(m) => {
            m.active_ephemeral.remove(ephemeral_id);
        }
        AgentNode::Coder(c) => {
            c.active_ephemeral.remove(ephemeral_id);
        }
        AgentNode::Tester(_) => {}
    }
}
