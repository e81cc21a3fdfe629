//! Event store errors

use crate::hash::ChainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Journal integrity error: {0}")]
    Chain(#[from] ChainError),

    #[error("Invalid journal line in {file}:{line}: {reason}")]
    InvalidLine {
        file: String,
        line: usize,
        reason: String,
    },
}
