//! Wire-level value objects shared between the agent tree and the
//! interpreters. `TaskMessage`/`ResultMessage` (which additionally carry
//! agent references) live in `hma-agent`, since only that crate knows the
//! `AgentNode` type they point at.

use serde::{Deserialize, Serialize};

/// A delegated or spawned unit of work. Immutable once created.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub task_string: String,
}

impl Task {
    pub fn new(task_string: impl Into<String>) -> Self {
        Self {
            task_id: uuid::Uuid::new_v4().to_string(),
            task_string: task_string.into(),
        }
    }
}
