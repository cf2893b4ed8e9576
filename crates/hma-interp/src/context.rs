//! Plain data the interpreters need about the surrounding agent tree.
//!
//! Interpreters never touch `AgentNode` directly (that type lives in
//! `hma-agent`, which depends on this crate, not the other way around) — the
//! caller hands over just enough state to validate scope and report status.

use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct ChildInfo {
    /// Absolute path of the child's file (Coder) or directory (Manager).
    pub path: PathBuf,
    pub is_active: bool,
}

/// Everything a Manager (or Master) interpreter call needs about its agent.
pub struct ManagerContext<'a> {
    pub scope_dir: PathBuf,
    pub project_root: PathBuf,
    pub is_master: bool,
    pub children: &'a [ChildInfo],
    /// Children currently holding a delegated, not-yet-resulted task —
    /// distinct from `children.len()`, which also counts idle ones.
    pub active_children_count: usize,
    pub active_ephemeral_count: usize,
    pub run_timeout_secs: u64,
}

/// Everything a Coder interpreter call needs about its agent.
pub struct CoderContext {
    pub own_file: PathBuf,
    pub project_root: PathBuf,
    pub has_active_ephemeral: bool,
    pub active_ephemeral_count: usize,
    pub run_timeout_secs: u64,
}

/// Everything a Tester interpreter call needs. Testers are ephemeral and own
/// no file of their own — READ/CHANGE operate on a private scratch file.
pub struct TesterContext {
    pub scratch_file: PathBuf,
    pub project_root: PathBuf,
    pub run_timeout_secs: u64,
}
