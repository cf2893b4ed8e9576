//! The agent tree: `AgentNode` is the sum type every prompter and
//! interpreter call operates on. Parents own children through `Arc`;
//! children hold a non-owning `Weak` back-reference so the tree has no
//! reference cycle and drops cleanly from the root down.

use dashmap::DashMap;
use hma_core::{AgentKind, Message, Task};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, RwLock};

/// State shared by every agent kind.
pub struct AgentCore {
    pub parent: Option<Weak<AgentNode>>,
    /// True once the agent has been deactivated by FINISH.
    active: AtomicBool,
    /// Single-flight guard: exactly one `generate_response` call may be in
    /// flight for this agent at a time.
    stall: AtomicBool,
    prompt_queue: Mutex<VecDeque<String>>,
    active_task: Mutex<Option<Task>>,
    memory: Mutex<Vec<Message>>,
    /// Set by FINISH on the root Master, which has no parent to report a
    /// `ResultMessage` to — this is the run's user-visible output instead.
    final_result: Mutex<Option<String>>,
}

impl AgentCore {
    /// The root has no parent and is activated by its initial goal rather
    /// than a `TaskMessage`, so it starts active; every other agent is born
    /// idle (`active ⇔ has active_task`) until DELEGATE hands it a task.
    pub fn new(parent: Option<Weak<AgentNode>>) -> Self {
        let starts_active = parent.is_none();
        Self {
            parent,
            active: AtomicBool::new(starts_active),
            stall: AtomicBool::new(false),
            prompt_queue: Mutex::new(VecDeque::new()),
            active_task: Mutex::new(None),
            memory: Mutex::new(Vec::new()),
            final_result: Mutex::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Called when a `TaskMessage` hands this agent a task to work on.
    pub fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub async fn set_final_result(&self, result: String) {
        *self.final_result.lock().await = Some(result);
    }

    pub async fn final_result(&self) -> Option<String> {
        self.final_result.lock().await.clone()
    }

    /// Attempts to claim the single-flight slot. Returns `true` if this
    /// caller now owns the right to make the next `generate_response` call.
    pub fn try_claim(&self) -> bool {
        self.stall
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn release(&self) {
        self.stall.store(false, Ordering::SeqCst);
    }

    pub async fn queue_prompt(&self, prompt: String) {
        let mut q = self.prompt_queue.lock().await;
        if !q.contains(&prompt) {
            q.push_back(prompt);
        }
    }

    pub async fn drain_queue(&self) -> Vec<String> {
        let mut q = self.prompt_queue.lock().await;
        q.drain(..).collect()
    }

    pub async fn has_queued(&self) -> bool {
        !self.prompt_queue.lock().await.is_empty()
    }

    pub async fn set_active_task(&self, task: Option<Task>) {
        *self.active_task.lock().await = task;
    }

    pub async fn active_task(&self) -> Option<Task> {
        self.active_task.lock().await.clone()
    }

    pub async fn remember(&self, message: Message) {
        self.memory.lock().await.push(message);
    }

    pub async fn history(&self) -> Vec<Message> {
        self.memory.lock().await.clone()
    }
}

pub struct ManagerAgent {
    pub core: AgentCore,
    pub path: PathBuf,
    /// The single root agent in the tree has no parent and owns the whole
    /// project rather than a subdirectory (spec: Master is a Manager
    /// superset, not a separate grammar).
    pub is_master: bool,
    pub children: RwLock<Vec<Arc<AgentNode>>>,
    /// Children currently holding a delegated, not-yet-resulted task. Set on
    /// DELEGATE, cleared when the child's `ResultMessage` comes back.
    pub active_children: DashMap<PathBuf, ()>,
    pub active_ephemeral: DashMap<String, ()>,
}

pub struct CoderAgent {
    pub core: AgentCore,
    pub own_file: PathBuf,
    pub active_ephemeral: DashMap<String, ()>,
}

pub struct TesterAgent {
    pub core: AgentCore,
    pub scratch_file: PathBuf,
}

pub enum AgentNode {
    Manager(ManagerAgent),
    Coder(CoderAgent),
    Tester(TesterAgent),
}

impl AgentNode {
    pub fn kind(&self) -> AgentKind {
        match self {
            AgentNode::Manager(m) if m.is_master => AgentKind::Master,
            AgentNode::Manager(_) => AgentKind::Manager,
            AgentNode::Coder(_) => AgentKind::Coder,
            AgentNode::Tester(_) => AgentKind::Tester,
        }
    }

    pub fn core(&self) -> &AgentCore {
        match self {
            AgentNode::Manager(m) => &m.core,
            AgentNode::Coder(c) => &c.core,
            AgentNode::Tester(t) => &t.core,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            AgentNode::Manager(m) => &m.path,
            AgentNode::Coder(c) => &c.own_file,
            AgentNode::Tester(t) => &t.scratch_file,
        }
    }

    pub fn as_manager(&self) -> Option<&ManagerAgent> {
        match self {
            AgentNode::Manager(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_coder(&self) -> Option<&CoderAgent> {
        match self {
            AgentNode::Coder(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_tester(&self) -> Option<&TesterAgent> {
        match self {
            AgentNode::Tester(t) => Some(t),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<Arc<AgentNode>> {
        self.core().parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn new_master(path: PathBuf) -> Arc<Self> {
        Arc::new(AgentNode::Manager(ManagerAgent {
            core: AgentCore::new(None),
            path,
            is_master: true,
            children: RwLock::new(Vec::new()),
            active_children: DashMap::new(),
            active_ephemeral: DashMap::new(),
        }))
    }

    pub fn new_manager(path: PathBuf, parent: &Arc<AgentNode>) -> Arc<Self> {
        Arc::new(AgentNode::Manager(ManagerAgent {
            core: AgentCore::new(Some(Arc::downgrade(parent))),
            path,
            is_master: false,
            children: RwLock::new(Vec::new()),
            active_children: DashMap::new(),
            active_ephemeral: DashMap::new(),
        }))
    }

    pub fn new_coder(own_file: PathBuf, parent: &Arc<AgentNode>) -> Arc<Self> {
        Arc::new(AgentNode::Coder(CoderAgent {
            core: AgentCore::new(Some(Arc::downgrade(parent))),
            own_file,
            active_ephemeral: DashMap::new(),
        }))
    }

    pub fn new_tester(scratch_file: PathBuf, parent: &Arc<AgentNode>) -> Arc<Self> {
        Arc::new(AgentNode::Tester(TesterAgent {
            core: AgentCore::new(Some(Arc::downgrade(parent))),
            scratch_file,
        }))
    }
}

/// A task handed from a parent to a child (spec §3: immutable, carries a
/// non-owning reference to both ends so delivery never keeps an agent alive
/// past its own lifetime).
#[derive(Clone)]
pub struct TaskMessage {
    pub message_id: String,
    pub sender: Weak<AgentNode>,
    pub recipient: Weak<AgentNode>,
    pub task: Task,
}

impl TaskMessage {
    pub fn new(sender: &Arc<AgentNode>, recipient: &Arc<AgentNode>, task: Task) -> Self {
        Self {
            message_id: uuid::Uuid::new_v4().to_string(),
            sender: Arc::downgrade(sender),
            recipient: Arc::downgrade(recipient),
            task,
        }
    }
}

/// A result handed from a child back to its parent on FINISH.
#[derive(Clone)]
pub struct ResultMessage {
    pub message_id: String,
    pub sender: Weak<AgentNode>,
    pub recipient: Weak<AgentNode>,
    pub task: Task,
    pub result: String,
}

impl ResultMessage {
    pub fn new(sender: &Arc<AgentNode>, recipient: &Arc<AgentNode>, task: Task, result: String) -> Self {
        Self {
            message_id: uuid::Uuid::new_v4().to_string(),
            sender: Arc::downgrade(sender),
            recipient: Arc::downgrade(recipient),
            task,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_has_no_parent() {
        let master = AgentNode::new_master(PathBuf::from("/project"));
        assert!(master.parent().is_none());
        assert_eq!(master.kind(), AgentKind::Master);
    }

    #[test]
    fn child_holds_weak_reference_not_strong() {
        let master = AgentNode::new_master(PathBuf::from("/project"));
        let child = AgentNode::new_manager(PathBuf::from("/project/src"), &master);
        assert_eq!(Arc::strong_count(&master), 1);
        assert!(child.parent().is_some());
    }

    #[tokio::test]
    async fn single_flight_guard_blocks_second_claim() {
        let master = AgentNode::new_master(PathBuf::from("/project"));
        assert!(master.core().try_claim());
        assert!(!master.core().try_claim());
        master.core().release();
        assert!(master.core().try_claim());
    }

    #[tokio::test]
    async fn queue_prompt_deduplicates_identical_entries() {
        let master = AgentNode::new_master(PathBuf::from("/project"));
        master.core().queue_prompt("do the thing".to_string()).await;
        master.core().queue_prompt("do the thing".to_string()).await;
        master.core().queue_prompt("do another thing".to_string()).await;
        let drained = master.core().drain_queue().await;
        assert_eq!(drained, vec!["do the thing", "do another thing"]);
    }
}
