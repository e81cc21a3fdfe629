//! CTAS Events - Emitted events and their journal
//!
//! Every successful state change in the workflow emits `LedgerEvent`s.
//! Committed events are wrapped in hash-chained `JournalRecord`s and
//! appended to JSONL files. JSONL is the Source of Truth - state and
//! projections are rebuilt from it.

pub mod error;
pub mod event;
pub mod hash;
pub mod reader;
pub mod record;
pub mod store;

pub use error::EventError;
pub use event::LedgerEvent;
pub use hash::{verify_chain, ChainError};
pub use reader::EventReader;
pub use record::{ChainHead, JournalRecord, GENESIS_HASH};
pub use store::EventStore;
