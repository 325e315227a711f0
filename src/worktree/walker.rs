//! Working tree enumeration
//!
//! The change detector only sees the working tree through [`WorkTree`], so
//! it can be exercised against an in-memory tree in tests. [`FsWorkTree`] is
//! the real implementation, built on `walkdir`.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::domain::{Fingerprint, ScanIssue};
use crate::storage::ZIT_DIR;

/// What a repo-relative path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Missing, or something other than a regular file or directory
    Other,
}

/// Boxed lazy sequence of repo-relative file paths
pub type Files<'a> = Box<dyn Iterator<Item = Result<String, ScanIssue>> + 'a>;

/// Read access to a working tree
///
/// Paths are repo-relative with `/` separators; `""` is the root.
pub trait WorkTree {
    /// Lazily enumerates regular files below `dir`, skipping hidden entries,
    /// the metadata directory and ignored names
    ///
    /// Every call starts a new walk.
    fn files_under(&self, dir: &str) -> Files<'_>;

    /// Enumerates every regular file in the tree
    fn files(&self) -> Files<'_> {
        self.files_under("")
    }

    /// Reports what a path refers to
    fn kind(&self, path: &str) -> EntryKind;

    /// Fingerprints a file's current content
    fn fingerprint(&self, path: &str) -> io::Result<Fingerprint>;
}

/// Working tree on the local filesystem
#[derive(Debug, Clone)]
pub struct FsWorkTree {
    root: PathBuf,
    ignore: Vec<String>,
}

impl FsWorkTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore: Vec::new(),
        }
    }

    /// Adds names (file or directory) to skip during walks
    pub fn with_ignore(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.ignore.extend(names);
        self
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        // The walk root is never filtered, even if its own name is hidden
        if entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        name.starts_with('.') || name == ZIT_DIR || self.ignore.iter().any(|i| *i == name)
    }

    fn absolute(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }
}

/// Converts a path below `root` into the repo-relative `/` form
pub fn to_repo_relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

impl WorkTree for FsWorkTree {
    fn files_under(&self, dir: &str) -> Files<'_> {
        let start = dir.to_string();
        let walk = WalkDir::new(self.absolute(dir))
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| !self.is_excluded(e));

        Box::new(walk.filter_map(move |entry| match entry {
            Ok(entry) if entry.file_type().is_file() => {
                match to_repo_relative(&self.root, entry.path()) {
                    Some(rel) => Some(Ok(rel)),
                    None => Some(Err(ScanIssue::unreadable(
                        entry.path().to_string_lossy(),
                        &io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
                    ))),
                }
            }
            Ok(_) => None,
            Err(err) => {
                let path = err
                    .path()
                    .and_then(|p| to_repo_relative(&self.root, p))
                    .unwrap_or_else(|| start.clone());
                let io_err = io::Error::from(err);
                tracing::warn!(path = %path, error = %io_err, "skipping unreadable entry");
                Some(Err(ScanIssue::unreadable(path, &io_err)))
            }
        }))
    }

    fn kind(&self, path: &str) -> EntryKind {
        match fs::symlink_metadata(self.absolute(path)) {
            Ok(meta) if meta.is_file() => EntryKind::File,
            Ok(meta) if meta.is_dir() => EntryKind::Dir,
            _ => EntryKind::Other,
        }
    }

    fn fingerprint(&self, path: &str) -> io::Result<Fingerprint> {
        Fingerprint::of_file(&self.absolute(path))
    }
}
