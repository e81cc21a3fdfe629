//! Account identity
//!
//! An `AccountId` is an opaque address. Two ids are the same account only
//! when their strings are byte-for-byte equal: no case folding, no checksum
//! normalization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Account id cannot be empty")]
    Empty,

    #[error("Account id cannot contain whitespace: {0:?}")]
    Whitespace(String),
}

/// Opaque account address
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Result<Self, AccountIdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(AccountIdError::Empty);
        }
        if id.chars().any(char::is_whitespace) {
            return Err(AccountIdError::Whitespace(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_equality() {
        let lower = AccountId::new("0xabc").unwrap();
        let upper = AccountId::new("0xABC").unwrap();
        assert_ne!(lower, upper);
        assert_eq!(lower, "0xabc".parse().unwrap());
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert_eq!(AccountId::new(""), Err(AccountIdError::Empty));
        assert!(matches!(
            AccountId::new("0x ab"),
            Err(AccountIdError::Whitespace(_))
        ));
    }

    #[test]
    fn test_serde_transparent_string() {
        let id = AccountId::new("0xfeed").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0xfeed\"");
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<AccountId>("\"\"").is_err());
    }
}
