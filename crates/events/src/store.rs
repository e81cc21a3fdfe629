//! Journal writer - chains events and appends them to daily JSONL files

use crate::error::EventError;
use crate::event::LedgerEvent;
use crate::record::{ChainHead, JournalRecord};
use chrono::{DateTime, NaiveDate, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only journal. Each appended event is sealed onto the current
/// chain head and written to `<dir>/<YYYY-MM-DD>.jsonl` for its UTC day.
pub struct EventStore {
    dir: PathBuf,
    head: ChainHead,
    day: Option<(NaiveDate, File)>,
}

impl EventStore {
    /// Open a journal directory for appending. `last` is the final record
    /// already in the journal, `None` when it is empty; the caller has
    /// verified the chain up to it.
    pub fn open(dir: impl AsRef<Path>, last: Option<&JournalRecord>) -> Result<Self, EventError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            head: last.map(ChainHead::of).unwrap_or_default(),
            day: None,
        })
    }

    /// Seal `event` as the next record and write it as one line.
    ///
    /// The head only moves once the line is written, so a failed append
    /// leaves the store ready to retry the same sequence.
    pub fn append(
        &mut self,
        event: LedgerEvent,
        timestamp: DateTime<Utc>,
    ) -> Result<JournalRecord, EventError> {
        let record = JournalRecord::seal(&self.head, event, timestamp)?;

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');
        self.file_for(record.timestamp.date_naive())?
            .write_all(line.as_bytes())?;

        self.head = ChainHead::of(&record);
        debug!(
            sequence = record.sequence,
            event = record.event.name(),
            "journal record appended"
        );
        Ok(record)
    }

    pub fn head(&self) -> &ChainHead {
        &self.head
    }

    /// Sequence of the last record, 0 for an empty journal
    pub fn sequence(&self) -> u64 {
        self.head.sequence
    }

    fn file_for(&mut self, date: NaiveDate) -> Result<&mut File, EventError> {
        if !matches!(&self.day, Some((open, _)) if *open == date) {
            let path = self.dir.join(format!("{}.jsonl", date.format("%Y-%m-%d")));
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            self.day = Some((date, file));
        }
        match &mut self.day {
            Some((_, file)) => Ok(file),
            None => unreachable!("day file opened above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::verify_chain;
    use crate::reader::EventReader;
    use chrono::TimeZone;
    use ctas_core::{AccountId, Amount};
    use tempfile::TempDir;

    fn deposit(units: u64) -> LedgerEvent {
        LedgerEvent::Deposited {
            from: AccountId::new("donor").unwrap(),
            amount: Amount::from_units(units),
        }
    }

    fn jsonl_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "jsonl"))
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_append_chains_and_rotates_by_day() {
        let temp = TempDir::new().unwrap();
        let mut store = EventStore::open(temp.path(), None).unwrap();
        assert_eq!(store.sequence(), 0);

        let day1 = Utc.with_ymd_and_hms(2023, 1, 1, 23, 59, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2023, 1, 2, 0, 1, 0).unwrap();

        let first = store.append(deposit(1), day1).unwrap();
        let second = store.append(deposit(2), day2).unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.prev_hash, first.hash);
        assert_eq!(store.head(), &ChainHead::of(&second));

        let files = jsonl_files(temp.path());
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("2023-01-01.jsonl"));

        let records = EventReader::from_directory(temp.path())
            .unwrap()
            .read_all()
            .unwrap();
        assert_eq!(records, vec![first, second]);
        assert!(verify_chain(&records).is_ok());
    }

    #[test]
    fn test_reopen_continues_chain() {
        let temp = TempDir::new().unwrap();
        let day = Utc.with_ymd_and_hms(2023, 3, 1, 12, 0, 0).unwrap();

        let last = {
            let mut store = EventStore::open(temp.path(), None).unwrap();
            store.append(deposit(1), day).unwrap();
            store.append(deposit(2), day).unwrap()
        };

        let mut store = EventStore::open(temp.path(), Some(&last)).unwrap();
        assert_eq!(store.sequence(), 2);
        let third = store.append(deposit(3), day).unwrap();
        assert_eq!(third.sequence, 3);
        assert_eq!(third.prev_hash, last.hash);

        // Same day: one file, appended to rather than truncated
        assert_eq!(jsonl_files(temp.path()).len(), 1);
        let records = EventReader::from_directory(temp.path())
            .unwrap()
            .read_all()
            .unwrap();
        assert_eq!(records.len(), 3);
        assert!(verify_chain(&records).is_ok());
    }
}
