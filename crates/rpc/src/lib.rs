//! CTAS RPC - operator CLI orchestrator
//!
//! Replays the journal into a `FundSystem`, runs one operation, then commits
//! the emitted events to the journal and the projection.

pub mod commands;
pub mod config;
pub mod context;

pub use config::CliConfig;
pub use context::{AppContext, ContextError};
