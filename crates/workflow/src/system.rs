//! Approval workflow logic

use crate::config::WorkflowConfig;
use crate::error::{Action, WorkflowError};
use ctas_core::{AccountId, Amount, Clock, RequestId, RequestStatus, SystemClock, Timestamp};
use ctas_events::LedgerEvent;
use ctas_ledger::{FundRequest, RequestLedger};
use ctas_roles::{require_fund_manager, require_whitelisted_ip, RoleRegistry};
use ctas_treasury::{Payout, Treasury};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Role registry, treasury and request ledger behind one set of guarded
/// operations.
///
/// Methods that change state take `&mut self`; the borrow checker gives a
/// single writer per instance. Share across threads with
/// [`SharedFundSystem`](crate::SharedFundSystem).
pub struct FundSystem {
    pub(crate) config: WorkflowConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) roles: RoleRegistry,
    pub(crate) treasury: Treasury,
    pub(crate) ledger: RequestLedger,
    pub(crate) outbox: Vec<LedgerEvent>,
}

impl fmt::Debug for FundSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FundSystem")
            .field("config", &self.config)
            .field("roles", &self.roles)
            .field("treasury", &self.treasury)
            .field("ledger", &self.ledger)
            .field("outbox", &self.outbox)
            .finish_non_exhaustive()
    }
}

impl FundSystem {
    /// Deploy with default config and the wall clock
    pub fn new(owner: AccountId, initial_funding: Amount) -> Self {
        Self::deploy(
            owner,
            initial_funding,
            WorkflowConfig::default(),
            Arc::new(SystemClock),
        )
    }

    /// Deploy a fresh system. `initial_funding` is credited to the treasury
    /// and a `Deployed` event is emitted.
    pub fn deploy(
        owner: AccountId,
        initial_funding: Amount,
        config: WorkflowConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut system = Self::empty(owner.clone(), initial_funding, config, clock);
        info!(%owner, %initial_funding, "fund system deployed");
        let first_request_id = system.config.first_request_id();
        system.outbox.push(LedgerEvent::Deployed {
            owner,
            initial_funding,
            first_request_id,
        });
        system
    }

    pub(crate) fn empty(
        owner: AccountId,
        initial_funding: Amount,
        config: WorkflowConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ledger = RequestLedger::new(config.first_request_id());
        Self {
            config,
            clock,
            roles: RoleRegistry::new(owner),
            treasury: Treasury::new(initial_funding),
            ledger,
            outbox: Vec::new(),
        }
    }

    // === Treasury ===

    /// Credit the treasury. Returns the new balance.
    pub fn deposit(&mut self, from: &AccountId, amount: Amount) -> Result<Amount, WorkflowError> {
        let balance = self.treasury.deposit(amount)?;
        info!(%from, %amount, %balance, "deposit received");
        self.outbox.push(LedgerEvent::Deposited {
            from: from.clone(),
            amount,
        });
        Ok(balance)
    }

    pub fn balance(&self) -> Amount {
        self.treasury.balance()
    }

    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    // === Roles ===

    /// Owner only. Returns `false` (and emits nothing) if already a member.
    pub fn add_fund_manager(
        &mut self,
        caller: &AccountId,
        account: AccountId,
    ) -> Result<bool, WorkflowError> {
        let added = self
            .roles
            .add_fund_manager(caller, account.clone())
            .map_err(|e| refused("add_fund_manager", caller, e.into()))?;
        if added {
            info!(%account, "fund manager added");
            self.outbox.push(LedgerEvent::FundManagerAdded { account });
        }
        Ok(added)
    }

    /// Owner only. Returns `false` (and emits nothing) if already whitelisted.
    pub fn add_ip(&mut self, caller: &AccountId, account: AccountId) -> Result<bool, WorkflowError> {
        let added = self
            .roles
            .add_ip(caller, account.clone())
            .map_err(|e| refused("add_ip", caller, e.into()))?;
        if added {
            info!(%account, "implementing partner whitelisted");
            self.outbox.push(LedgerEvent::IpAdded { account });
        }
        Ok(added)
    }

    /// Owner only. Returns `false` if `account` was not a fund manager.
    pub fn remove_fund_manager(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
    ) -> Result<bool, WorkflowError> {
        let removed = self
            .roles
            .remove_fund_manager(caller, account)
            .map_err(|e| refused("remove_fund_manager", caller, e.into()))?;
        if removed {
            info!(%account, "fund manager removed");
            self.outbox.push(LedgerEvent::FundManagerRemoved {
                account: account.clone(),
            });
        }
        Ok(removed)
    }

    /// Owner only. Returns `false` if `account` was not whitelisted.
    pub fn remove_ip(&mut self, caller: &AccountId, account: &AccountId) -> Result<bool, WorkflowError> {
        let removed = self
            .roles
            .remove_ip(caller, account)
            .map_err(|e| refused("remove_ip", caller, e.into()))?;
        if removed {
            info!(%account, "implementing partner removed");
            self.outbox.push(LedgerEvent::IpRemoved {
                account: account.clone(),
            });
        }
        Ok(removed)
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    // === Requests ===

    /// Create a request on behalf of a whitelisted IP.
    ///
    /// Emits `FundRequested` carrying the new id.
    pub fn request_fund(
        &mut self,
        caller: &AccountId,
        amount: Amount,
        description: &str,
        deadline: Timestamp,
    ) -> Result<RequestId, WorkflowError> {
        self.try_request_fund(caller, amount, description, deadline)
            .map_err(|e| refused("request_fund", caller, e))
    }

    fn try_request_fund(
        &mut self,
        caller: &AccountId,
        amount: Amount,
        description: &str,
        deadline: Timestamp,
    ) -> Result<RequestId, WorkflowError> {
        require_whitelisted_ip(&self.roles, caller)?;

        let now = self.clock.now();
        let id = self
            .ledger
            .create(caller.clone(), amount, description, deadline, now)?;

        info!(request_id = %id, requester = %caller, %amount, deadline, "fund requested");
        self.outbox.push(LedgerEvent::FundRequested {
            request_id: id,
            requester: caller.clone(),
            amount,
            description: description.to_string(),
            deadline,
            created_at: now,
        });
        Ok(id)
    }

    /// Fund manager only. `Pending -> Approved`.
    pub fn approve_request(&mut self, caller: &AccountId, id: RequestId) -> Result<(), WorkflowError> {
        self.decide(caller, id, Action::Approve)
            .map_err(|e| refused("approve_request", caller, e))?;
        self.outbox.push(LedgerEvent::RequestApproved {
            request_id: id,
            by: caller.clone(),
        });
        Ok(())
    }

    /// Fund manager only. `Pending -> Rejected`.
    pub fn reject_request(&mut self, caller: &AccountId, id: RequestId) -> Result<(), WorkflowError> {
        self.decide(caller, id, Action::Reject)
            .map_err(|e| refused("reject_request", caller, e))?;
        self.outbox.push(LedgerEvent::RequestRejected {
            request_id: id,
            by: caller.clone(),
        });
        Ok(())
    }

    fn decide(&mut self, caller: &AccountId, id: RequestId, action: Action) -> Result<(), WorkflowError> {
        require_fund_manager(&self.roles, caller)?;
        let request = self.ledger.get(id)?;
        ensure_status(request, action)?;

        let status = action.target_status();
        self.ledger.set_status(id, status)?;
        info!(request_id = %id, by = %caller, %status, "request decided");
        Ok(())
    }

    /// Fund manager only. Pays an `Approved` request to its requester and
    /// marks it `Released`.
    ///
    /// If the treasury cannot cover the amount the request stays `Approved`.
    pub fn release_fund(&mut self, caller: &AccountId, id: RequestId) -> Result<Payout, WorkflowError> {
        let payout = self
            .try_release_fund(caller, id)
            .map_err(|e| refused("release_fund", caller, e))?;
        self.outbox.push(LedgerEvent::FundReleased {
            request_id: id,
            to: payout.destination.clone(),
            amount: payout.amount,
            by: caller.clone(),
        });
        Ok(payout)
    }

    fn try_release_fund(&mut self, caller: &AccountId, id: RequestId) -> Result<Payout, WorkflowError> {
        require_fund_manager(&self.roles, caller)?;
        let request = self.ledger.get(id)?;
        ensure_status(request, Action::Release)?;

        let (requester, amount) = (request.requester.clone(), request.amount);
        let payout = self.treasury.pay_out(&requester, amount)?;
        self.ledger.set_status(id, RequestStatus::Released)?;

        info!(
            request_id = %id,
            to = %requester,
            %amount,
            remaining = %payout.remaining,
            "fund released"
        );
        Ok(payout)
    }

    /// Status code of a request: 1=Pending, 2=Approved, 3=Rejected, 4=Released
    pub fn check_request_status(&self, id: RequestId) -> Result<u8, WorkflowError> {
        Ok(self.status(id)?.code())
    }

    pub fn status(&self, id: RequestId) -> Result<RequestStatus, WorkflowError> {
        Ok(self.ledger.get(id)?.status)
    }

    pub fn request(&self, id: RequestId) -> Result<&FundRequest, WorkflowError> {
        Ok(self.ledger.get(id)?)
    }

    pub fn requests(&self) -> impl Iterator<Item = &FundRequest> {
        self.ledger.iter()
    }

    pub fn next_request_id(&self) -> Result<RequestId, WorkflowError> {
        Ok(self.ledger.next_id()?)
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    // === Events ===

    /// Events emitted since the last `take_events`, oldest first
    pub fn pending_events(&self) -> &[LedgerEvent] {
        &self.outbox
    }

    /// Drain the emitted events
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.outbox)
    }
}

fn ensure_status(request: &FundRequest, action: Action) -> Result<(), WorkflowError> {
    if request.status == action.required_status() {
        Ok(())
    } else {
        Err(WorkflowError::InvalidTransition {
            id: request.id,
            from: request.status,
            action,
        })
    }
}

fn refused(operation: &'static str, caller: &AccountId, err: WorkflowError) -> WorkflowError {
    warn!(operation, %caller, kind = %err.kind(), error = %err, "operation refused");
    err
}
