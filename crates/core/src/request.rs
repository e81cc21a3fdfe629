//! Fund request identity and lifecycle status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Ledger-assigned request identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The id allocated after this one
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Lifecycle status of a fund request
///
/// `Pending -> Approved -> Released` and `Pending -> Rejected`.
/// `Rejected` and `Released` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Released,
}

impl RequestStatus {
    /// All statuses in code order
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Rejected,
        RequestStatus::Released,
    ];

    /// External status code. Existing collaborators depend on this exact
    /// mapping: 1=Pending, 2=Approved, 3=Rejected, 4=Released.
    pub const fn code(&self) -> u8 {
        match self {
            RequestStatus::Pending => 1,
            RequestStatus::Approved => 2,
            RequestStatus::Rejected => 3,
            RequestStatus::Released => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(RequestStatus::Pending),
            2 => Some(RequestStatus::Approved),
            3 => Some(RequestStatus::Rejected),
            4 => Some(RequestStatus::Released),
            _ => None,
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Rejected | RequestStatus::Released)
    }

    /// Whether the state machine allows `self -> next`
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
                | (RequestStatus::Approved, RequestStatus::Released)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_fixed() {
        assert_eq!(RequestStatus::Pending.code(), 1);
        assert_eq!(RequestStatus::Approved.code(), 2);
        assert_eq!(RequestStatus::Rejected.code(), 3);
        assert_eq!(RequestStatus::Released.code(), 4);

        for status in RequestStatus::ALL {
            assert_eq!(RequestStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(RequestStatus::from_code(0), None);
        assert_eq!(RequestStatus::from_code(5), None);
    }

    #[test]
    fn test_transitions() {
        use RequestStatus::*;

        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Released));

        assert!(!Pending.can_transition_to(Released));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Pending));
        for next in RequestStatus::ALL {
            assert!(!Rejected.can_transition_to(next));
            assert!(!Released.can_transition_to(next));
        }
    }

    #[test]
    fn test_status_names() {
        assert_eq!(RequestStatus::Released.to_string(), "released");
        assert_eq!(
            "APPROVED".parse::<RequestStatus>().unwrap(),
            RequestStatus::Approved
        );
        assert!("expired".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn test_request_id_next() {
        assert_eq!(RequestId::new(1).next(), Some(RequestId::new(2)));
        assert_eq!(RequestId::new(u64::MAX).next(), None);
        assert_eq!("42".parse::<RequestId>().unwrap(), RequestId::new(42));
    }
}
