//! Fund request record

use ctas_core::{AccountId, Amount, RequestId, RequestStatus, Timestamp};
use serde::{Deserialize, Serialize};

/// A request by an IP to draw `amount` from the treasury.
///
/// Everything except `status` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundRequest {
    pub id: RequestId,
    pub requester: AccountId,
    pub amount: Amount,
    pub description: String,
    /// Seconds since epoch; strictly after `created_at`
    pub deadline: Timestamp,
    pub created_at: Timestamp,
    pub status: RequestStatus,
}

impl FundRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Status code as seen by external callers (1..=4)
    pub fn status_code(&self) -> u8 {
        self.status.code()
    }
}
