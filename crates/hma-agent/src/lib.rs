//! hma-agent — owns the agent tree (`AgentNode`) and the single-flight
//! prompter loop that drives it. Depends on `hma-core`, `hma-lang`,
//! `hma-interp` and `hma-llm`; nothing downstream depends back on it.
//!
//! Ephemeral Tester bookkeeping lives directly on the owning
//! `ManagerAgent`/`CoderAgent` (`active_ephemeral: DashMap<String, ()>`)
//! rather than in a separate registry type — there is no pause/resume/kill
//! surface to justify one, just an active count the interpreters need to
//! see.

pub mod agent;
pub mod orchestrator;

pub use agent::{AgentNode, AgentCore, CoderAgent, ManagerAgent, ResultMessage, TaskMessage, TesterAgent};
pub use orchestrator::{coder_prompter, manager_prompter, master_prompter, tester_spawner};
