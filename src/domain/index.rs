//! Tracked file index
//!
//! The index maps repo-relative paths to the last fingerprint zit recorded
//! for them and whether that version is staged for the next commit.
//! Paths are keyed in a `BTreeMap`, so iteration order (and therefore the
//! on-disk order and commit file order) is always sorted by path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Fingerprint;

/// A tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Repo-relative path with `/` separators
    pub path: String,

    /// Fingerprint of the content last added
    pub fingerprint: Fingerprint,

    /// Whether this version goes into the next commit
    pub staged: bool,

    /// Head commit id when this version was staged (0 before any commit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staged_on: Option<u64>,
}

/// Set of tracked files, at most one entry per path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: BTreeMap<String, FileEntry>,
}

impl Index {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry loaded from storage, replacing any previous one for the same path
    pub fn insert(&mut self, entry: FileEntry) {
        self.entries.insert(entry.path.clone(), entry);
    }

    /// Records a new fingerprint for `path` and marks it staged
    ///
    /// Returns false when the entry was already staged with this fingerprint,
    /// in which case nothing changes.
    pub fn upsert(&mut self, path: &str, fingerprint: Fingerprint) -> bool {
        match self.entries.get_mut(path) {
            Some(entry) if entry.staged && entry.fingerprint == fingerprint => false,
            Some(entry) => {
                entry.fingerprint = fingerprint;
                entry.staged = true;
                true
            }
            None => {
                self.entries.insert(
                    path.to_string(),
                    FileEntry {
                        path: path.to_string(),
                        fingerprint,
                        staged: true,
                        staged_on: None,
                    },
                );
                true
            }
        }
    }

    /// Clears the staged flag on the given paths
    ///
    /// Paths that are not tracked are ignored.
    pub fn clear_staged<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>) {
        for path in paths {
            if let Some(entry) = self.entries.get_mut(path) {
                entry.staged = false;
                entry.staged_on = None;
            }
        }
    }

    /// Records the head commit the given staged paths were staged on
    pub fn mark_staged_on<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>, head: u64) {
        for path in paths {
            if let Some(entry) = self.entries.get_mut(path) {
                entry.staged_on = Some(head);
            }
        }
    }

    /// Unstages entries already consumed by a later commit
    ///
    /// A commit takes every staged entry, so an entry staged on an older
    /// head than `head` was committed even if its flag was never cleared.
    /// Returns the paths that were unstaged.
    pub fn reconcile(&mut self, head: u64) -> Vec<String> {
        let stale: Vec<String> = self
            .entries
            .values()
            .filter(|e| e.staged && e.staged_on.is_some_and(|on| on < head))
            .map(|e| e.path.clone())
            .collect();
        self.clear_staged(stale.iter().map(String::as_str));
        stale
    }

    /// Returns the entry for a path
    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.entries.get(path)
    }

    /// Returns true if the path is tracked
    pub fn is_tracked(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Returns the staged paths in sorted order
    pub fn staged_paths(&self) -> Vec<String> {
        self.entries
            .values()
            .filter(|e| e.staged)
            .map(|e| e.path.clone())
            .collect()
    }

    /// Iterates over all entries sorted by path
    pub fn entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
