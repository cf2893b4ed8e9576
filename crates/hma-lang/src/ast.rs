//! AST node types shared across the Manager, Coder and Tester directive
//! languages (Master reuses `ManagerDirective` directly).

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub is_folder: bool,
}

impl Target {
    pub fn file(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_folder: false }
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_folder: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EphemeralType {
    Tester,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnItem {
    pub ephemeral_type: EphemeralType,
    pub prompt: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegateItem {
    pub target: Target,
    pub prompt: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplaceItem {
    pub from: String,
    pub to: String,
}

/// Manager Language directive (also spoken, unmodified, by Master agents).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManagerDirective {
    Delegate(Vec<DelegateItem>),
    Spawn(Vec<SpawnItem>),
    Create(Vec<Target>),
    Delete(Vec<Target>),
    Read(Vec<Target>),
    Run(String),
    UpdateReadme(String),
    Wait,
    Finish(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoderDirective {
    Read(String),
    Run(String),
    Change(String),
    Replace(Vec<ReplaceItem>),
    Insert { from: String, to: String },
    Spawn(Vec<SpawnItem>),
    Wait,
    Finish(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TesterDirective {
    Read(String),
    Run(String),
    Change(String),
    Replace(Vec<ReplaceItem>),
    Finish(String),
}
