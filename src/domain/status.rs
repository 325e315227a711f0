//! File classification and working tree reports

use serde::Serialize;

use super::{FileEntry, Fingerprint};

/// How a file on disk relates to its index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Not tracked yet
    New,
    /// Tracked, content differs from the recorded fingerprint
    Modified,
    /// Tracked, content matches the recorded fingerprint
    Unchanged,
}

impl FileStatus {
    /// Classifies a file given its index entry (if any) and current fingerprint
    pub fn classify(entry: Option<&FileEntry>, current: &Fingerprint) -> Self {
        match entry {
            None => FileStatus::New,
            Some(entry) if entry.fingerprint != *current => FileStatus::Modified,
            Some(_) => FileStatus::Unchanged,
        }
    }

    /// Returns true if `add` should stage a file in this state
    pub fn needs_staging(&self) -> bool {
        matches!(self, FileStatus::New | FileStatus::Modified)
    }
}

/// Why a file could not be examined
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum IssueKind {
    /// Explicit path that does not exist
    Missing,
    /// Explicit path that resolves outside the repository
    OutsideRepository,
    /// Read failure (permissions, removed mid-scan, ...)
    Unreadable(String),
}

/// A per-file problem collected during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanIssue {
    pub path: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl ScanIssue {
    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: IssueKind::Missing,
        }
    }

    pub fn outside(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: IssueKind::OutsideRepository,
        }
    }

    pub fn unreadable(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self {
            path: path.into(),
            kind: IssueKind::Unreadable(err.to_string()),
        }
    }

    /// Returns true for problems with the arguments rather than the files
    pub fn is_bad_argument(&self) -> bool {
        matches!(self.kind, IssueKind::Missing | IssueKind::OutsideRepository)
    }

    /// Human-readable description
    pub fn describe(&self) -> String {
        match &self.kind {
            IssueKind::Missing => format!("{}: no such file or directory", self.path),
            IssueKind::OutsideRepository => format!("{}: outside repository", self.path),
            IssueKind::Unreadable(err) => format!("{}: unreadable ({})", self.path, err),
        }
    }
}

/// Working tree state relative to the index
///
/// A staged file whose content changed again after staging is listed only
/// under `staged`; it is not reported as modified until it is re-added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub new: Vec<String>,
    pub modified: Vec<String>,
    pub staged: Vec<String>,
    /// Tracked files no longer on disk
    pub deleted: Vec<String>,
    /// Tracked, unstaged files matching the index
    pub unchanged: usize,
    pub issues: Vec<ScanIssue>,
}

impl StatusReport {
    /// Records one scanned file
    pub fn record(&mut self, path: &str, status: FileStatus, entry: Option<&FileEntry>) {
        let staged = entry.map(|e| e.staged).unwrap_or(false);
        match status {
            FileStatus::New => self.new.push(path.to_string()),
            FileStatus::Modified if !staged => self.modified.push(path.to_string()),
            FileStatus::Unchanged if !staged => self.unchanged += 1,
            FileStatus::Modified | FileStatus::Unchanged => {}
        }
        if staged {
            self.staged.push(path.to_string());
        }
    }

    /// Returns true if there is nothing new, modified, staged or deleted
    pub fn is_clean(&self) -> bool {
        self.new.is_empty()
            && self.modified.is_empty()
            && self.staged.is_empty()
            && self.deleted.is_empty()
    }

    /// Sorts every list for deterministic output
    pub fn sort(&mut self) {
        self.new.sort();
        self.modified.sort();
        self.staged.sort();
        self.deleted.sort();
        self.issues.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// One-line summary
    pub fn brief(&self) -> String {
        if self.is_clean() {
            return "clean".to_string();
        }
        format!(
            "{} new, {} modified, {} staged, {} deleted",
            self.new.len(),
            self.modified.len(),
            self.staged.len(),
            self.deleted.len()
        )
    }
}

/// Outcome of staging a set of paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddReport {
    /// Paths whose entries were inserted or refreshed
    pub staged: Vec<String>,
    /// Paths examined and left untouched
    pub unchanged: Vec<String>,
    pub issues: Vec<ScanIssue>,
}

impl AddReport {
    /// Explicit arguments that did not name a file in the repository
    pub fn bad_arguments(&self) -> impl Iterator<Item = &ScanIssue> {
        self.issues.iter().filter(|i| i.is_bad_argument())
    }
}
