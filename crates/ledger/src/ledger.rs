//! Request ledger - id allocation and storage

use crate::error::LedgerError;
use crate::request::FundRequest;
use ctas_core::{AccountId, Amount, RequestId, RequestStatus, Timestamp};
use serde::{Deserialize, Serialize};

/// Append-only store of fund requests.
///
/// # Invariants
/// - Ids are dense: the n-th stored request has id `first_id + n`.
/// - Requests are never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLedger {
    first_id: RequestId,
    requests: Vec<FundRequest>,
}

impl Default for RequestLedger {
    fn default() -> Self {
        Self::new(RequestId::new(1))
    }
}

impl RequestLedger {
    /// Create an empty ledger whose first request will get `first_id`
    pub fn new(first_id: RequestId) -> Self {
        Self {
            first_id,
            requests: Vec::new(),
        }
    }

    /// Id the next successful `create` will return
    pub fn next_id(&self) -> Result<RequestId, LedgerError> {
        self.first_id
            .value()
            .checked_add(self.requests.len() as u64)
            .map(RequestId::new)
            .ok_or(LedgerError::IdExhausted)
    }

    /// Validate and store a new pending request.
    ///
    /// Fails with `InvalidRequest` if `amount` is zero or `deadline` is not
    /// strictly after `now`. A failed call does not consume an id.
    pub fn create(
        &mut self,
        requester: AccountId,
        amount: Amount,
        description: impl Into<String>,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Result<RequestId, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidRequest(
                "amount must be greater than zero".to_string(),
            ));
        }
        if deadline <= now {
            return Err(LedgerError::InvalidRequest(format!(
                "deadline {} is not after current time {}",
                deadline, now
            )));
        }

        let id = self.next_id()?;
        self.requests.push(FundRequest {
            id,
            requester,
            amount,
            description: description.into(),
            deadline,
            created_at: now,
            status: RequestStatus::Pending,
        });

        Ok(id)
    }

    /// Re-insert a request read back from the journal.
    ///
    /// Field validation is skipped (it ran at creation) but the id must be
    /// exactly `next_id`.
    pub fn restore(&mut self, request: FundRequest) -> Result<(), LedgerError> {
        let expected = self.next_id()?;
        if request.id != expected {
            return Err(LedgerError::OutOfOrder {
                expected,
                actual: request.id,
            });
        }
        self.requests.push(request);
        Ok(())
    }

    pub fn get(&self, id: RequestId) -> Result<&FundRequest, LedgerError> {
        self.index_of(id)
            .and_then(|index| self.requests.get(index))
            .ok_or(LedgerError::NotFound(id))
    }

    /// Overwrite the status of a stored request, leaving every other field
    /// untouched. Transition legality is the caller's concern.
    pub fn set_status(&mut self, id: RequestId, status: RequestStatus) -> Result<(), LedgerError> {
        let index = self.index_of(id).ok_or(LedgerError::NotFound(id))?;
        let request = self
            .requests
            .get_mut(index)
            .ok_or(LedgerError::NotFound(id))?;
        request.status = status;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// All requests in id order
    pub fn iter(&self) -> impl Iterator<Item = &FundRequest> {
        self.requests.iter()
    }

    /// Requests currently in `status`, in id order
    pub fn by_status(&self, status: RequestStatus) -> impl Iterator<Item = &FundRequest> {
        self.requests.iter().filter(move |r| r.status == status)
    }

    fn index_of(&self, id: RequestId) -> Option<usize> {
        let offset = id.value().checked_sub(self.first_id.value())?;
        usize::try_from(offset).ok()
    }
}
