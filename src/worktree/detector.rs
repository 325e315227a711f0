//! Change detection
//!
//! Compares the working tree against the index by content fingerprint.
//! Per-file failures (unreadable files, missing explicit paths) are
//! collected into the returned report instead of aborting the scan.

use std::collections::BTreeSet;

use super::walker::{EntryKind, WorkTree};
use crate::domain::{AddReport, FileStatus, Index, ScanIssue, StatusReport};

/// Which part of the tree an operation looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The whole working tree
    All,
    /// Specific repo-relative files or directories; `""` names the root
    Paths(Vec<String>),
}

/// Classifies working tree files against an index
pub struct ChangeDetector<'a, W: WorkTree + ?Sized> {
    tree: &'a W,
}

impl<'a, W: WorkTree + ?Sized> ChangeDetector<'a, W> {
    pub fn new(tree: &'a W) -> Self {
        Self { tree }
    }

    /// Computes the working tree status without touching the index
    pub fn status(&self, index: &Index) -> StatusReport {
        let mut report = StatusReport::default();
        let mut seen = BTreeSet::new();

        for file in self.tree.files() {
            match file {
                Ok(path) => {
                    self.examine(index, &path, &mut report);
                    seen.insert(path);
                }
                Err(issue) => report.issues.push(issue),
            }
        }

        // Tracked files the walk skipped (hidden, ignored) or that are gone
        for entry in index.entries() {
            if seen.contains(&entry.path) {
                continue;
            }
            if self.tree.kind(&entry.path) == EntryKind::File {
                self.examine(index, &entry.path, &mut report);
            } else {
                report.deleted.push(entry.path.clone());
                if entry.staged {
                    report.staged.push(entry.path.clone());
                }
            }
        }

        report.sort();
        report
    }

    /// Stages new and modified files within the selection
    ///
    /// Unchanged files are left as they are, so adding the same content
    /// twice does nothing the second time.
    pub fn stage(&self, index: &mut Index, selection: &Selection) -> AddReport {
        let mut report = AddReport::default();
        let candidates = self.candidates(index, selection, &mut report.issues);

        for path in candidates {
            let fingerprint = match self.tree.fingerprint(&path) {
                Ok(fp) => fp,
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "skipping unreadable file");
                    report.issues.push(ScanIssue::unreadable(&path, &err));
                    continue;
                }
            };

            let status = FileStatus::classify(index.get(&path), &fingerprint);
            if status.needs_staging() && index.upsert(&path, fingerprint) {
                report.staged.push(path);
            } else {
                report.unchanged.push(path);
            }
        }

        report
    }

    fn examine(&self, index: &Index, path: &str, report: &mut StatusReport) {
        match self.tree.fingerprint(path) {
            Ok(fp) => {
                let entry = index.get(path);
                report.record(path, FileStatus::classify(entry, &fp), entry);
            }
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "skipping unreadable file");
                report.issues.push(ScanIssue::unreadable(path, &err));
            }
        }
    }

    /// Resolves a selection into the sorted set of files to examine
    fn candidates(
        &self,
        index: &Index,
        selection: &Selection,
        issues: &mut Vec<ScanIssue>,
    ) -> BTreeSet<String> {
        let mut files = BTreeSet::new();

        let roots: Vec<&str> = match selection {
            Selection::All => vec![""],
            Selection::Paths(paths) => paths.iter().map(String::as_str).collect(),
        };

        for root in roots {
            match self.tree.kind(root) {
                EntryKind::File => {
                    files.insert(root.to_string());
                }
                EntryKind::Dir => {
                    for file in self.tree.files_under(root) {
                        match file {
                            Ok(path) => {
                                files.insert(path);
                            }
                            Err(issue) => issues.push(issue),
                        }
                    }
                    // Tracked files below this directory that the walk skips
                    for entry in index.entries() {
                        if is_within(&entry.path, root)
                            && self.tree.kind(&entry.path) == EntryKind::File
                        {
                            files.insert(entry.path.clone());
                        }
                    }
                }
                EntryKind::Other => issues.push(ScanIssue::missing(root)),
            }
        }

        files
    }
}

/// Returns true if `path` is `dir` or lies below it
fn is_within(path: &str, dir: &str) -> bool {
    dir.is_empty()
        || path == dir
        || (path.starts_with(dir) && path.as_bytes().get(dir.len()) == Some(&b'/'))
}
