//! # CTAS Workflow
//!
//! Approval workflow for treasury draw requests.
//!
//! ## Flow
//! - Whitelisted IP: `request_fund` creates a `Pending` request
//! - Fund manager: `approve_request` / `reject_request` decide it
//! - Fund manager: `release_fund` pays an `Approved` request out of the
//!   treasury and marks it `Released`
//!
//! ## Guarantees
//! - Single fund manager decides; no quorum
//! - Every operation is all-or-nothing
//! - Funds leave the treasury only through `release_fund`, once per request
//! - Successful operations emit `LedgerEvent`s; the journal replays them

mod config;
mod error;
mod replay;
mod shared;
mod system;

pub use config::WorkflowConfig;
pub use error::{Action, ErrorKind, WorkflowError};
pub use shared::SharedFundSystem;
pub use system::FundSystem;
