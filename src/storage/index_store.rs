//! Index persistence
//!
//! The index lives in `.zit/index.jsonl`, one `FileEntry` per line sorted by
//! path. Loading and saving an unmodified index reproduces the file byte for
//! byte.

use std::path::Path;

use anyhow::Result;

use super::jsonl::{CorruptRecord, JsonlFile};
use super::ZIT_DIR;
use crate::domain::{FileEntry, Index};

/// Store for the tracked file index
pub struct IndexStore {
    file: JsonlFile<FileEntry>,
}

impl IndexStore {
    /// Creates a store backed by the given file
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            file: JsonlFile::new(path),
        }
    }

    /// Creates the default store for a repository
    pub fn for_repo(root: &Path) -> Self {
        Self::new(root.join(ZIT_DIR).join("index.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the index, skipping corrupt lines
    ///
    /// If a path appears more than once the last line wins.
    pub fn load(&self) -> Result<(Index, Vec<CorruptRecord>)> {
        let read = self.file.read_all()?;

        let mut index = Index::new();
        for entry in read.records {
            index.insert(entry);
        }

        Ok((index, read.corrupt))
    }

    /// Writes the whole index, replacing the previous file atomically
    pub fn save(&self, index: &Index) -> Result<()> {
        self.file.write_all(index.entries())
    }
}
