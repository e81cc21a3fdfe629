//! Ledger errors

use ctas_core::RequestId;
use thiserror::Error;

/// Errors that can occur in request ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request not found: {0}")]
    NotFound(RequestId),

    #[error("Request id space exhausted")]
    IdExhausted,

    #[error("Out-of-order request: expected id {expected}, got {actual}")]
    OutOfOrder { expected: RequestId, actual: RequestId },
}
