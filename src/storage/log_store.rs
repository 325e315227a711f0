//! Commit log persistence
//!
//! Commits are stored oldest first in `.zit/commits.jsonl`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::jsonl::{CorruptRecord, JsonlFile};
use super::ZIT_DIR;
use crate::domain::{CommitLog, CommitRecord};

/// Store for the commit history
pub struct LogStore {
    file: JsonlFile<CommitRecord>,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonlFile::new(path),
        }
    }

    /// Creates the default store for a repository
    pub fn for_repo(root: &Path) -> Self {
        Self::new(root.join(ZIT_DIR).join("commits.jsonl"))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the history, skipping corrupt lines
    pub fn load(&self) -> Result<(CommitLog, Vec<CorruptRecord>)> {
        let read = self.file.read_all()?;
        Ok((CommitLog::from_records(read.records), read.corrupt))
    }

    /// Writes the whole history, replacing the previous file atomically
    pub fn save(&self, log: &CommitLog) -> Result<()> {
        self.file.write_all(log.iter_chronological())
    }
}
