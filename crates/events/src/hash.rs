//! Hash chain utilities for journal integrity

use crate::record::{JournalRecord, GENESIS_HASH};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Calculate SHA256 hash of record content (excluding the hash field itself)
///
/// The event is hashed in its JSON form; field order follows the enum
/// definition, so the digest is stable across writes.
pub fn calculate_record_hash(record: &JournalRecord) -> Result<String, serde_json::Error> {
    let event = serde_json::to_string(&record.event)?;

    let mut hasher = Sha256::new();
    hasher.update(record.sequence.to_le_bytes());
    hasher.update(record.prev_hash.as_bytes());
    hasher.update(record.timestamp.to_rfc3339().as_bytes());
    hasher.update(event.as_bytes());

    Ok(hex::encode(hasher.finalize()))
}

/// Verify hash chain integrity
pub fn verify_chain(records: &[JournalRecord]) -> Result<(), ChainError> {
    let mut prev_hash = GENESIS_HASH.to_string();
    let mut expected_sequence = 1;

    for record in records {
        if record.sequence != expected_sequence {
            return Err(ChainError::InvalidSequence {
                expected: expected_sequence,
                actual: record.sequence,
            });
        }

        if record.prev_hash != prev_hash {
            return Err(ChainError::BrokenLink {
                sequence: record.sequence,
                expected: prev_hash,
                actual: record.prev_hash.clone(),
            });
        }

        let calculated =
            calculate_record_hash(record).map_err(|e| ChainError::Unhashable {
                sequence: record.sequence,
                reason: e.to_string(),
            })?;
        if record.hash != calculated {
            return Err(ChainError::InvalidHash {
                sequence: record.sequence,
                expected: calculated,
                actual: record.hash.clone(),
            });
        }

        prev_hash = record.hash.clone();
        expected_sequence += 1;
    }

    Ok(())
}

/// Errors in hash chain verification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Broken link at seq {sequence}: expected prev_hash '{expected}', got '{actual}'")]
    BrokenLink {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid hash at seq {sequence}: expected '{expected}', got '{actual}'")]
    InvalidHash {
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("Invalid sequence: expected {expected}, got {actual}")]
    InvalidSequence { expected: u64, actual: u64 },

    #[error("Cannot hash record {sequence}: {reason}")]
    Unhashable { sequence: u64, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LedgerEvent;
    use crate::record::ChainHead;
    use chrono::Utc;
    use ctas_core::{AccountId, Amount};

    fn chain(len: usize) -> Vec<JournalRecord> {
        let mut records = Vec::new();
        let mut head = ChainHead::genesis();
        for i in 0..len {
            let event = LedgerEvent::Deposited {
                from: AccountId::new("donor").unwrap(),
                amount: Amount::from_units(i as u64 + 1),
            };
            let record = JournalRecord::seal(&head, event, Utc::now()).unwrap();
            head = ChainHead::of(&record);
            records.push(record);
        }
        records
    }

    #[test]
    fn test_hash_is_deterministic() {
        let records = chain(1);
        assert_eq!(calculate_record_hash(&records[0]).unwrap(), records[0].hash);
    }

    #[test]
    fn test_hash_covers_event_body() {
        let records = chain(1);
        let mut altered = records[0].clone();
        altered.event = LedgerEvent::Deposited {
            from: AccountId::new("donor").unwrap(),
            amount: Amount::from_units(2),
        };
        assert_ne!(calculate_record_hash(&altered).unwrap(), records[0].hash);
    }

    #[test]
    fn test_valid_chain() {
        assert_eq!(verify_chain(&chain(5)), Ok(()));
        assert_eq!(verify_chain(&[]), Ok(()));
    }

    #[test]
    fn test_tampered_event_detected() {
        let mut records = chain(3);
        records[1].event = LedgerEvent::Deposited {
            from: AccountId::new("donor").unwrap(),
            amount: Amount::from_units(1_000_000),
        };

        assert!(matches!(
            verify_chain(&records),
            Err(ChainError::InvalidHash { sequence: 2, .. })
        ));
    }

    #[test]
    fn test_broken_link_detected() {
        let mut records = chain(3);
        records[2].prev_hash = "deadbeef".to_string();

        assert!(matches!(
            verify_chain(&records),
            Err(ChainError::BrokenLink { sequence: 3, .. })
        ));
    }

    #[test]
    fn test_missing_record_detected() {
        let mut records = chain(3);
        records.remove(1);

        assert_eq!(
            verify_chain(&records),
            Err(ChainError::InvalidSequence {
                expected: 2,
                actual: 3
            })
        );
    }
}
