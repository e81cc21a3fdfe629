//! Rebuild a fund system from committed events
//!
//! Events in the journal were authorized when they were first emitted, so
//! replay skips role checks. It still refuses anything that would break the
//! request state machine or overdraw the treasury: that can only mean the
//! journal is corrupt.

use crate::config::WorkflowConfig;
use crate::error::{Action, WorkflowError};
use crate::system::FundSystem;
use ctas_core::{Clock, RequestId, RequestStatus};
use ctas_events::LedgerEvent;
use ctas_ledger::FundRequest;
use ctas_roles::Role;
use std::sync::Arc;
use tracing::debug;

impl FundSystem {
    /// Rebuild from a journal's events. The first event must be `Deployed`.
    ///
    /// The id origin comes from `Deployed`, never from the current config,
    /// so a journal replays the same way whatever config it is opened with.
    /// Nothing is added to the outbox.
    pub fn replay<'a, I>(events: I, clock: Arc<dyn Clock>) -> Result<Self, WorkflowError>
    where
        I: IntoIterator<Item = &'a LedgerEvent>,
    {
        let mut events = events.into_iter();

        let mut system = match events.next() {
            Some(LedgerEvent::Deployed {
                owner,
                initial_funding,
                first_request_id,
            }) => {
                let config = WorkflowConfig {
                    first_request_id: first_request_id.value(),
                };
                FundSystem::empty(owner.clone(), *initial_funding, config, clock)
            }
            Some(other) => {
                return Err(WorkflowError::Replay(format!(
                    "journal must start with deployed, found {}",
                    other.name()
                )))
            }
            None => return Err(WorkflowError::Replay("journal is empty".to_string())),
        };

        let mut applied = 1usize;
        for event in events {
            system.apply(event)?;
            applied += 1;
        }

        debug!(
            events = applied,
            requests = system.ledger.len(),
            balance = %system.treasury.balance(),
            "fund system replayed"
        );
        Ok(system)
    }

    /// Apply one committed event
    pub fn apply(&mut self, event: &LedgerEvent) -> Result<(), WorkflowError> {
        match event {
            LedgerEvent::Deployed { .. } => {
                return Err(WorkflowError::Replay(
                    "deployed may only appear once, at the start".to_string(),
                ));
            }
            LedgerEvent::Deposited { amount, .. } => {
                self.treasury.deposit(*amount).map_err(corrupt)?;
            }
            LedgerEvent::FundManagerAdded { account } => {
                self.roles
                    .restore_membership(Role::FundManager, account.clone(), true);
            }
            LedgerEvent::FundManagerRemoved { account } => {
                self.roles
                    .restore_membership(Role::FundManager, account.clone(), false);
            }
            LedgerEvent::IpAdded { account } => {
                self.roles
                    .restore_membership(Role::WhitelistedIp, account.clone(), true);
            }
            LedgerEvent::IpRemoved { account } => {
                self.roles
                    .restore_membership(Role::WhitelistedIp, account.clone(), false);
            }
            LedgerEvent::FundRequested {
                request_id,
                requester,
                amount,
                description,
                deadline,
                created_at,
            } => {
                self.ledger.restore(FundRequest {
                    id: *request_id,
                    requester: requester.clone(),
                    amount: *amount,
                    description: description.clone(),
                    deadline: *deadline,
                    created_at: *created_at,
                    status: RequestStatus::Pending,
                })
                .map_err(corrupt)?;
            }
            LedgerEvent::RequestApproved { request_id, .. } => {
                self.replay_transition(*request_id, Action::Approve)?;
            }
            LedgerEvent::RequestRejected { request_id, .. } => {
                self.replay_transition(*request_id, Action::Reject)?;
            }
            LedgerEvent::FundReleased {
                request_id,
                to,
                amount,
                ..
            } => {
                let request = self.ledger.get(*request_id).map_err(corrupt)?;
                if &request.requester != to || request.amount != *amount {
                    return Err(WorkflowError::Replay(format!(
                        "release of request {} does not match its requester or amount",
                        request_id
                    )));
                }
                if request.status != Action::Release.required_status() {
                    return Err(WorkflowError::Replay(format!(
                        "cannot release request {} from status {}",
                        request_id, request.status
                    )));
                }
                self.treasury.pay_out(to, *amount).map_err(corrupt)?;
                self.ledger
                    .set_status(*request_id, RequestStatus::Released)
                    .map_err(corrupt)?;
            }
        }
        Ok(())
    }

    fn replay_transition(
        &mut self,
        id: RequestId,
        action: Action,
    ) -> Result<(), WorkflowError> {
        let from = self.ledger.get(id).map_err(corrupt)?.status;
        if from != action.required_status() {
            return Err(WorkflowError::Replay(format!(
                "cannot {} request {} from status {}",
                action, id, from
            )));
        }
        self.ledger
            .set_status(id, action.target_status())
            .map_err(corrupt)?;
        Ok(())
    }
}

fn corrupt<E: std::fmt::Display>(err: E) -> WorkflowError {
    WorkflowError::Replay(err.to_string())
}
