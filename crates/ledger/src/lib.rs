//! CTAS Ledger - Append-only record of fund requests
//!
//! The ledger validates and stores requests and hands out sequential ids.
//! It does not enforce the approval state machine; that belongs to the
//! workflow.
//!
//! # Key Types
//! - `FundRequest`: A request to draw from the treasury
//! - `RequestLedger`: Id allocator and request storage

pub mod error;
pub mod ledger;
pub mod request;

pub use error::LedgerError;
pub use ledger::RequestLedger;
pub use request::FundRequest;
