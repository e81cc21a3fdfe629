//! Thread-safe handle with one writer at a time

use crate::error::WorkflowError;
use crate::system::FundSystem;
use ctas_core::{AccountId, Amount, RequestId, Timestamp};
use ctas_events::LedgerEvent;
use ctas_treasury::Payout;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle to one `FundSystem`.
///
/// Each call holds the lock until it returns, so calls are applied one at
/// a time in lock order and readers never see a half-applied operation.
#[derive(Debug, Clone)]
pub struct SharedFundSystem {
    inner: Arc<Mutex<FundSystem>>,
}

impl SharedFundSystem {
    pub fn new(system: FundSystem) -> Self {
        Self {
            inner: Arc::new(Mutex::new(system)),
        }
    }

    /// Exclusive access for multi-step work (e.g. an operation followed by
    /// draining its events)
    pub fn lock(&self) -> Result<MutexGuard<'_, FundSystem>, WorkflowError> {
        self.inner.lock().map_err(|_| WorkflowError::Poisoned)
    }

    pub fn request_fund(
        &self,
        caller: &AccountId,
        amount: Amount,
        description: &str,
        deadline: Timestamp,
    ) -> Result<RequestId, WorkflowError> {
        self.lock()?
            .request_fund(caller, amount, description, deadline)
    }

    pub fn approve_request(&self, caller: &AccountId, id: RequestId) -> Result<(), WorkflowError> {
        self.lock()?.approve_request(caller, id)
    }

    pub fn reject_request(&self, caller: &AccountId, id: RequestId) -> Result<(), WorkflowError> {
        self.lock()?.reject_request(caller, id)
    }

    pub fn release_fund(&self, caller: &AccountId, id: RequestId) -> Result<Payout, WorkflowError> {
        self.lock()?.release_fund(caller, id)
    }

    pub fn check_request_status(&self, id: RequestId) -> Result<u8, WorkflowError> {
        self.lock()?.check_request_status(id)
    }

    pub fn deposit(&self, from: &AccountId, amount: Amount) -> Result<Amount, WorkflowError> {
        self.lock()?.deposit(from, amount)
    }

    pub fn balance(&self) -> Result<Amount, WorkflowError> {
        Ok(self.lock()?.balance())
    }

    pub fn take_events(&self) -> Result<Vec<LedgerEvent>, WorkflowError> {
        Ok(self.lock()?.take_events())
    }
}
