//! Cross-module tests for hma-core: types, protocol, config and error
//! taxonomy behavior that doesn't belong to any single module.

use hma_core::*;
use std::path::PathBuf;

// ===========================================================================
// Message / Role
// ===========================================================================

#[test]
fn message_constructors_set_role() {
    let m = Message::system("be helpful");
    assert_eq!(m.role, Role::System);
    let m = Message::user("hello");
    assert_eq!(m.role, Role::User);
    let m = Message::assistant("hi");
    assert_eq!(m.role, Role::Assistant);
}

#[test]
fn message_serde_roundtrip() {
    let m = Message::user("ping");
    let json = serde_json::to_string(&m).unwrap();
    let back: Message = serde_json::from_str(&json).unwrap();
    assert_eq!(back.role, Role::User);
    assert_eq!(back.content, "ping");
}

#[test]
fn agent_kind_display() {
    assert_eq!(AgentKind::Master.to_string(), "master");
    assert_eq!(AgentKind::Tester.to_string(), "tester");
}

// ===========================================================================
// Task
// ===========================================================================

#[test]
fn task_new_generates_unique_ids() {
    let a = Task::new("do a thing");
    let b = Task::new("do a thing");
    assert_ne!(a.task_id, b.task_id);
    assert_eq!(a.task_string, "do a thing");
}

// ===========================================================================
// RuntimeConfig
// ===========================================================================

#[test]
fn default_config_uses_console_provider() {
    let config = RuntimeConfig::default();
    assert!(config.uses_console_provider());
}

#[test]
fn config_with_api_key_does_not_use_console() {
    let config = RuntimeConfig {
        api_key: Some("sk-ant-test".to_string()),
        model: "anthropic/claude".to_string(),
        ..RuntimeConfig::default()
    };
    assert!(!config.uses_console_provider());
}

#[test]
fn is_command_allowed_matches_prefix() {
    let config = RuntimeConfig::default();
    assert!(config.is_command_allowed("cargo test -- my_test"));
    assert!(!config.is_command_allowed("rm -rf /"));
}

#[test]
fn load_falls_back_to_defaults_on_missing_file() {
    let config = RuntimeConfig::load(&PathBuf::from("/nonexistent/hma.toml")).unwrap();
    assert_eq!(config.model, "console");
}

// ===========================================================================
// InterpreterError
// ===========================================================================

#[test]
fn only_activation_error_is_not_locally_recoverable() {
    assert!(!InterpreterError::ActivationError("gone".to_string()).is_locally_recoverable());
    assert!(InterpreterError::NothingToWaitFor.is_locally_recoverable());
    assert!(InterpreterError::ScopeError("x".to_string()).is_locally_recoverable());
}

#[test]
fn recovery_prompt_is_non_empty_for_every_variant() {
    let errors = vec![
        InterpreterError::ParseError("bad".to_string()),
        InterpreterError::ScopeError("bad".to_string()),
        InterpreterError::MissingString("bad".to_string()),
        InterpreterError::AmbiguousString("bad".to_string()),
        InterpreterError::InvalidCommand("bad".to_string()),
        InterpreterError::CommandTimeout(60, "bad".to_string()),
        InterpreterError::UnknownEphemeralType("bad".to_string()),
        InterpreterError::NothingToWaitFor,
        InterpreterError::ActiveEphemeralAgents(2),
        InterpreterError::ActiveChildren(1),
        InterpreterError::NoParent,
        InterpreterError::Filesystem("bad".to_string()),
        InterpreterError::ActivationError("bad".to_string()),
    ];
    for e in errors {
        assert!(!e.recovery_prompt().is_empty());
    }
}
