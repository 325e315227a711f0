//! Commit records and the linear commit history
//!
//! History is a single append-only sequence. Records are never edited
//! after they are appended; the only way the log changes is by growing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CommitError {
    #[error("Nothing staged to commit. Use 'zit add' first.")]
    NothingStaged,

    #[error("Commit message cannot be empty")]
    EmptyMessage,

    #[error("Commit id space exhausted after commit {0}")]
    IdOverflow(u64),
}

/// An immutable commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Sequence number, starting at 1
    pub id: u64,

    pub message: String,

    pub author: String,

    pub timestamp: DateTime<Utc>,

    /// Paths included in this commit, sorted
    pub files: Vec<String>,
}

/// Ordered commit history, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitLog {
    records: Vec<CommitRecord>,
}

impl CommitLog {
    /// Creates an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from records read back from storage
    ///
    /// Records are ordered by id so a hand-edited file still iterates
    /// chronologically.
    pub fn from_records(mut records: Vec<CommitRecord>) -> Self {
        records.sort_by_key(|r| r.id);
        Self { records }
    }

    /// Returns the id the next commit will get
    ///
    /// Continues from the highest id seen, so ids are never reused even if
    /// a corrupt record was dropped on load.
    pub fn next_id(&self) -> Result<u64, CommitError> {
        let head = self.head_id();
        head.checked_add(1).ok_or(CommitError::IdOverflow(head))
    }

    /// Id of the most recent commit, or 0 before the first one
    pub fn head_id(&self) -> u64 {
        self.records.last().map_or(0, |r| r.id)
    }

    /// Appends a commit for the given staged paths
    pub fn append(
        &mut self,
        message: &str,
        author: &str,
        staged_paths: Vec<String>,
    ) -> Result<&CommitRecord, CommitError> {
        self.append_at(message, author, staged_paths, Utc::now())
    }

    /// Appends a commit with an explicit timestamp
    pub fn append_at(
        &mut self,
        message: &str,
        author: &str,
        mut staged_paths: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<&CommitRecord, CommitError> {
        if staged_paths.is_empty() {
            return Err(CommitError::NothingStaged);
        }
        if message.trim().is_empty() {
            return Err(CommitError::EmptyMessage);
        }

        let id = self.next_id()?;
        staged_paths.sort();
        staged_paths.dedup();

        let record = CommitRecord {
            id,
            message: message.to_string(),
            author: author.to_string(),
            timestamp,
            files: staged_paths,
        };
        self.records.push(record);

        Ok(&self.records[self.records.len() - 1])
    }

    /// Iterates most recent first
    ///
    /// Each call starts a fresh pass over the same records.
    pub fn iter_recent(&self) -> impl Iterator<Item = &CommitRecord> {
        self.records.iter().rev()
    }

    /// Iterates oldest first, the order records are stored in
    pub fn iter_chronological(&self) -> impl Iterator<Item = &CommitRecord> {
        self.records.iter()
    }

    /// Returns the most recent commit
    pub fn head(&self) -> Option<&CommitRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
