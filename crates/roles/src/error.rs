//! Access control errors

use crate::registry::Role;
use ctas_core::AccountId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Unauthorized: {caller} is not {required}")]
    Unauthorized { caller: AccountId, required: Role },
}
