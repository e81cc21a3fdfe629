//! Journal record - one committed event in the hash chain

use crate::event::LedgerEvent;
use crate::hash::calculate_record_hash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `prev_hash` of the first record
pub const GENESIS_HASH: &str = "GENESIS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Starts at 1, increments by one
    pub sequence: u64,
    pub prev_hash: String,
    /// SHA256 over every other field
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub event: LedgerEvent,
}

/// Tip of the chain: what the next record links to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHead {
    /// 0 before the first record
    pub sequence: u64,
    pub hash: String,
}

impl ChainHead {
    pub fn genesis() -> Self {
        Self {
            sequence: 0,
            hash: GENESIS_HASH.to_string(),
        }
    }

    pub fn of(record: &JournalRecord) -> Self {
        Self {
            sequence: record.sequence,
            hash: record.hash.clone(),
        }
    }
}

impl Default for ChainHead {
    fn default() -> Self {
        Self::genesis()
    }
}

impl JournalRecord {
    /// Build and hash the record that follows `head`
    pub fn seal(
        head: &ChainHead,
        event: LedgerEvent,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        let mut record = Self {
            sequence: head.sequence + 1,
            prev_hash: head.hash.clone(),
            hash: String::new(),
            timestamp,
            event,
        };
        record.hash = calculate_record_hash(&record)?;
        Ok(record)
    }
}
