//! hma-lang — the directive languages spoken by Manager, Coder, Tester and
//! Master agents.
//!
//! Master reuses the Manager grammar verbatim (spec Design Notes: only the
//! canonical grammar is ported, with `is_master` living on the agent/
//! interpreter rather than forking the AST).

pub mod ast;
pub mod coder;
pub mod escape;
pub mod manager;
pub mod scanner;
pub mod tester;

pub use ast::{
    CoderDirective, DelegateItem, EphemeralType, ManagerDirective, ReplaceItem, SpawnItem,
    Target, TesterDirective,
};
pub use scanner::ParseError;

pub use manager::parse_manager_directive as parse_master_directive;
pub use manager::parse_manager_directive;

pub use coder::parse_coder_directive;
pub use tester::parse_tester_directive;
