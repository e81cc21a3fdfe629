//! Workflow errors

use ctas_core::{RequestId, RequestStatus};
use ctas_ledger::LedgerError;
use ctas_roles::AccessError;
use ctas_treasury::TreasuryError;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;

/// Operation attempted on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Approve,
    Reject,
    Release,
}

impl Action {
    /// Status the request must be in for this action
    pub fn required_status(&self) -> RequestStatus {
        match self {
            Action::Approve | Action::Reject => RequestStatus::Pending,
            Action::Release => RequestStatus::Approved,
        }
    }

    /// Status the request moves to on success
    pub fn target_status(&self) -> RequestStatus {
        match self {
            Action::Approve => RequestStatus::Approved,
            Action::Reject => RequestStatus::Rejected,
            Action::Release => RequestStatus::Released,
        }
    }
}

/// Errors from the approval workflow
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Treasury(#[from] TreasuryError),

    #[error("Cannot {action} request {id}: status is {from}")]
    InvalidTransition {
        id: RequestId,
        from: RequestStatus,
        action: Action,
    },

    #[error("Journal replay failed: {0}")]
    Replay(String),

    #[error("Fund system lock poisoned")]
    Poisoned,
}

/// Stable classification of workflow failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    Unauthorized,
    InvalidRequest,
    InvalidTransition,
    NotFound,
    InsufficientFunds,
    /// Journal corruption, arithmetic overflow, poisoned lock
    Integrity,
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Access(AccessError::Unauthorized { .. }) => ErrorKind::Unauthorized,
            WorkflowError::Ledger(LedgerError::InvalidRequest(_)) => ErrorKind::InvalidRequest,
            WorkflowError::Ledger(LedgerError::NotFound(_)) => ErrorKind::NotFound,
            WorkflowError::Ledger(LedgerError::IdExhausted | LedgerError::OutOfOrder { .. }) => {
                ErrorKind::Integrity
            }
            WorkflowError::Treasury(TreasuryError::InsufficientFunds { .. }) => {
                ErrorKind::InsufficientFunds
            }
            WorkflowError::Treasury(TreasuryError::Overflow) => ErrorKind::Integrity,
            WorkflowError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            WorkflowError::Replay(_) | WorkflowError::Poisoned => ErrorKind::Integrity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctas_core::{AccountId, Amount};
    use ctas_roles::Role;

    #[test]
    fn test_kinds() {
        let unauthorized = WorkflowError::from(AccessError::Unauthorized {
            caller: AccountId::new("x").unwrap(),
            required: Role::FundManager,
        });
        assert_eq!(unauthorized.kind(), ErrorKind::Unauthorized);

        let missing = WorkflowError::from(LedgerError::NotFound(RequestId::new(9)));
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let broke = WorkflowError::from(TreasuryError::InsufficientFunds {
            requested: Amount::from_units(2),
            available: Amount::from_units(1),
        });
        assert_eq!(broke.kind(), ErrorKind::InsufficientFunds);
    }

    #[test]
    fn test_transition_message() {
        let err = WorkflowError::InvalidTransition {
            id: RequestId::new(4),
            from: RequestStatus::Released,
            action: Action::Release,
        };
        assert_eq!(err.to_string(), "Cannot release request 4: status is released");
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn test_action_statuses() {
        assert_eq!(Action::Approve.required_status(), RequestStatus::Pending);
        assert_eq!(Action::Reject.target_status(), RequestStatus::Rejected);
        assert_eq!(Action::Release.required_status(), RequestStatus::Approved);
        for action in [Action::Approve, Action::Reject, Action::Release] {
            assert!(action
                .required_status()
                .can_transition_to(action.target_status()));
        }
    }
}
