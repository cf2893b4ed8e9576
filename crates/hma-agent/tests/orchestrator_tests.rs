//! End-to-end scenario tests driving the orchestrator through a scripted
//! LLM, covering the "Master delegates, Coder finishes" shape.
//!
//! Note: these scenarios don't have the Master itself FINISH, so once a
//! test's `MockLlmProvider` queue runs dry the root keeps retrying in the
//! background, matching the real "ask the LLM again on failure" recovery
//! policy. Assertions are taken on a snapshot shortly after the scenario's
//! meaningful transition rather than waiting for full quiescence.

use hma_agent::{master_prompter, AgentNode};
use hma_core::RuntimeConfig;
use hma_llm::MockLlmProvider;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn delegate_wakes_coder_and_finish_deactivates_it() {
    let dir = tempdir().unwrap();
    let coder_path = dir.path().join("main.rs");
    std::fs::write(&coder_path, "fn main() {}").unwrap();

    let master = AgentNode::new_master(dir.path().to_path_buf());
    let coder = AgentNode::new_coder(coder_path.clone(), &master);
    master
        .as_manager()
        .unwrap()
        .children
        .write()
        .await
        .push(coder.clone());

    let delegate_directive = r#"DELEGATE FILE "main.rs" PROMPT="add a doc comment""#.to_string();
    let llm = Arc::new(MockLlmProvider::new(vec![
        delegate_directive,
        r#"FINISH PROMPT="added the doc comment""#.to_string(),
    ]));

    let mut config = RuntimeConfig::default();
    config.project_root = dir.path().to_path_buf();
    let config = Arc::new(config);

    master_prompter(master.clone(), "build the thing".to_string(), llm, config).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(!coder.core().is_active());
    assert!(master.core().is_active());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn root_finish_stores_final_result_instead_of_reporting_to_a_parent() {
    let dir = tempdir().unwrap();
    let master = AgentNode::new_master(dir.path().to_path_buf());

    let llm = Arc::new(MockLlmProvider::new(vec![
        r#"FINISH PROMPT="all done""#.to_string(),
    ]));

    let mut config = RuntimeConfig::default();
    config.project_root = dir.path().to_path_buf();
    let config = Arc::new(config);

    master_prompter(master.clone(), "build the thing".to_string(), llm, config).await;

    assert!(!master.core().is_active());
    assert_eq!(master.core().final_result().await, Some("all done".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn child_finish_clears_parents_active_children_entry() {
    let dir = tempdir().unwrap();
    let coder_path = dir.path().join("main.rs");
    std::fs::write(&coder_path, "fn main() {}").unwrap();

    let master = AgentNode::new_master(dir.path().to_path_buf());
    let coder = AgentNode::new_coder(coder_path.clone(), &master);
    master
        .as_manager()
        .unwrap()
        .children
        .write()
        .await
        .push(coder.clone());

    let delegate_directive = r#"DELEGATE FILE "main.rs" PROMPT="add a doc comment""#.to_string();
    let llm = Arc::new(MockLlmProvider::new(vec![
        delegate_directive,
        r#"FINISH PROMPT="added the doc comment""#.to_string(),
    ]));

    let mut config = RuntimeConfig::default();
    config.project_root = dir.path().to_path_buf();
    let config = Arc::new(config);

    master_prompter(master.clone(), "build the thing".to_string(), llm, config).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(master.as_manager().unwrap().active_children.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn delegate_to_unknown_target_recovers_locally_without_spawning() {
    // A ScopeError is locally recoverable, so the manager loop keeps asking
    // the LLM again — once the scripted queue runs dry it retries forever.
    // Spawn rather than await directly, matching how every other entry
    // point in this orchestrator treats a prompter as fire-and-forget.
    let dir = tempdir().unwrap();
    let master = AgentNode::new_master(dir.path().to_path_buf());

    let llm = Arc::new(MockLlmProvider::new(vec![
        r#"DELEGATE FILE "missing.rs" PROMPT="do it""#.to_string(),
    ]));

    let mut config = RuntimeConfig::default();
    config.project_root = dir.path().to_path_buf();
    let config = Arc::new(config);

    tokio::spawn(master_prompter(
        master.clone(),
        "build the thing".to_string(),
        llm,
        config,
    ));
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(master.core().is_active());
    assert!(master.as_manager().unwrap().children.read().await.is_empty());
}
