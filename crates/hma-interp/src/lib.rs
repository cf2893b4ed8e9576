//! hma-interp — turns parsed directives (hma-lang) into filesystem/process
//! side effects and a structured outcome for the caller's agent tree to act
//! on. Stays ignorant of `AgentNode`/`Arc`/`Weak` on purpose: hma-agent
//! depends on this crate, not the reverse.

pub mod coder;
pub mod commands;
pub mod context;
pub mod fs_ops;
pub mod manager;
pub mod tester;

pub use coder::CoderEffect;
pub use manager::ManagerEffect;
pub use tester::TesterEffect;
