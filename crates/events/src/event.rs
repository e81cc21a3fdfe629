//! Events emitted by the fund system

use ctas_core::{AccountId, Amount, RequestId, Timestamp};
use serde::{Deserialize, Serialize};

/// Observable outcome of a successful operation.
///
/// External collaborators learn request ids from `FundRequested`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// System created with an owner and initial treasury funding.
    /// Carries the id origin so replay does not depend on the current config.
    Deployed {
        owner: AccountId,
        initial_funding: Amount,
        first_request_id: RequestId,
    },

    /// Funds credited to the treasury
    Deposited { from: AccountId, amount: Amount },

    FundManagerAdded { account: AccountId },

    FundManagerRemoved { account: AccountId },

    IpAdded { account: AccountId },

    IpRemoved { account: AccountId },

    /// A whitelisted IP created a request
    FundRequested {
        request_id: RequestId,
        requester: AccountId,
        amount: Amount,
        description: String,
        deadline: Timestamp,
        created_at: Timestamp,
    },

    RequestApproved { request_id: RequestId, by: AccountId },

    RequestRejected { request_id: RequestId, by: AccountId },

    /// Treasury paid `amount` to `to` for an approved request
    FundReleased {
        request_id: RequestId,
        to: AccountId,
        amount: Amount,
        by: AccountId,
    },
}

impl LedgerEvent {
    /// Request the event refers to, if any
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            LedgerEvent::FundRequested { request_id, .. }
            | LedgerEvent::RequestApproved { request_id, .. }
            | LedgerEvent::RequestRejected { request_id, .. }
            | LedgerEvent::FundReleased { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }

    /// Short name, matching the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::Deployed { .. } => "deployed",
            LedgerEvent::Deposited { .. } => "deposited",
            LedgerEvent::FundManagerAdded { .. } => "fund_manager_added",
            LedgerEvent::FundManagerRemoved { .. } => "fund_manager_removed",
            LedgerEvent::IpAdded { .. } => "ip_added",
            LedgerEvent::IpRemoved { .. } => "ip_removed",
            LedgerEvent::FundRequested { .. } => "fund_requested",
            LedgerEvent::RequestApproved { .. } => "request_approved",
            LedgerEvent::RequestRejected { .. } => "request_rejected",
            LedgerEvent::FundReleased { .. } => "fund_released",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    #[test]
    fn test_request_id_accessor() {
        let requested = LedgerEvent::FundRequested {
            request_id: RequestId::new(3),
            requester: id("ip"),
            amount: Amount::from_units(1),
            description: "test".to_string(),
            deadline: 10,
            created_at: 5,
        };
        assert_eq!(requested.request_id(), Some(RequestId::new(3)));

        let added = LedgerEvent::IpAdded { account: id("ip") };
        assert_eq!(added.request_id(), None);
    }

    #[test]
    fn test_tagged_json_shape() {
        let event = LedgerEvent::RequestApproved {
            request_id: RequestId::new(1),
            by: id("fm"),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "request_approved");
        assert_eq!(json["type"], event.name());
        assert_eq!(json["request_id"], 1);
        assert_eq!(json["by"], "fm");
    }
}
