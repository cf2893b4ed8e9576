//! hma-core — shared types, error taxonomy, and runtime configuration.

pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

pub use config::RuntimeConfig;
pub use error::{Error, Result};
pub use protocol::*;
pub use types::*;
