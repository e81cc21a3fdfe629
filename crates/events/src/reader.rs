//! JSONL event reader - sequential reader for replay

use crate::error::EventError;
use crate::record::JournalRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Sequential journal reader for replay
pub struct EventReader {
    files: Vec<PathBuf>,
}

impl EventReader {
    /// Create a new reader from a directory. A missing directory reads as an
    /// empty journal.
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, EventError> {
        let path = path.as_ref();
        let mut files = Vec::new();

        if path.exists() {
            for entry in std::fs::read_dir(path)? {
                let entry = entry?;
                let file_path = entry.path();
                if file_path.extension().map_or(false, |ext| ext == "jsonl") {
                    files.push(file_path);
                }
            }
        }

        // File names are ISO dates, so lexical order is chronological
        files.sort();

        Ok(Self { files })
    }

    /// Read all records from all files in order
    pub fn read_all(&self) -> Result<Vec<JournalRecord>, EventError> {
        let mut records = Vec::new();

        for file_path in &self.files {
            let reader = BufReader::new(File::open(file_path)?);

            for (index, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: JournalRecord =
                    serde_json::from_str(&line).map_err(|e| EventError::InvalidLine {
                        file: file_path.display().to_string(),
                        line: index + 1,
                        reason: e.to_string(),
                    })?;
                records.push(record);
            }
        }

        Ok(records)
    }
}
