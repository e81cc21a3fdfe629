//! Projection errors

use ctas_core::RequestId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Request not found in projection: {0}")]
    NotFound(RequestId),

    #[error("Corrupt projection row for request {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}
