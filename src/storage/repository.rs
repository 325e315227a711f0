//! Repository management
//!
//! Handles initialization and runs each command as one locked
//! load-mutate-save cycle over the index and commit log.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;

use super::jsonl::CorruptRecord;
use super::{Config, IndexStore, LogStore, RepoConfig, RepoLock, ZIT_DIR};
use crate::domain::{AddReport, CommitLog, CommitRecord, Index, ScanIssue, StatusReport};
use crate::worktree::{to_repo_relative, ChangeDetector, FsWorkTree, Selection};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Repository already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Not in a zit repository. Run 'zit init' first.")]
    NotInitialized,

    #[error("Path not found: {}", .0.join(", "))]
    PathNotFound(Vec<String>),

    #[error("Timed out waiting for repository lock: {0}")]
    LockTimeout(PathBuf),
}

/// An open zit repository
///
/// Holds the repository lock for as long as it is alive.
pub struct Repository {
    root: PathBuf,
    config: Config,
    author: String,
    index: Index,
    log: CommitLog,
    corrupt: Vec<(PathBuf, CorruptRecord)>,
    _lock: RepoLock,
}

impl Repository {
    /// Opens an existing repository at the given root
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let zit_dir = root.join(ZIT_DIR);

        if !zit_dir.is_dir() {
            return Err(RepoError::NotInitialized.into());
        }

        // Only the timeout is taken from this read; the config proper is
        // loaded once the lock is held
        let timeout_ms = Config::load_repo_config(&root)
            .map(|c| c.lock_timeout_ms)
            .unwrap_or(RepoConfig::default().lock_timeout_ms);
        let lock = RepoLock::acquire(&zit_dir, Duration::from_millis(timeout_ms))?;
        let config = Config::for_repo(&root)?;

        let index_store = IndexStore::for_repo(&root);
        let log_store = LogStore::for_repo(&root);
        let (mut index, index_corrupt) = index_store.load()?;
        let (log, log_corrupt) = log_store.load()?;

        let recovered = index.reconcile(log.head_id());
        if !recovered.is_empty() {
            tracing::warn!(
                files = recovered.len(),
                head = log.head_id(),
                "unstaging files left staged by an interrupted commit"
            );
        }

        let corrupt = index_corrupt
            .into_iter()
            .map(|c| (index_store.path().to_path_buf(), c))
            .chain(
                log_corrupt
                    .into_iter()
                    .map(|c| (log_store.path().to_path_buf(), c)),
            )
            .collect();

        tracing::debug!(
            root = %root.display(),
            tracked = index.len(),
            commits = log.len(),
            "opened repository"
        );

        Ok(Self {
            author: config.effective_author(),
            root,
            config,
            index,
            log,
            corrupt,
            _lock: lock,
        })
    }

    /// Opens the repository containing the current directory
    pub fn open_current() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let root = Self::find_root(&cwd).ok_or(RepoError::NotInitialized)?;

        Self::open(root)
    }

    /// Finds the repository root by looking for `.zit/` in `start` and its parents
    pub fn find_root(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(ZIT_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Initializes a new repository at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let zit_dir = root.join(ZIT_DIR);

        if zit_dir.exists() {
            return Err(RepoError::AlreadyInitialized(root).into());
        }

        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create directory: {}", root.display()))?;

        match fs::create_dir(&zit_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(RepoError::AlreadyInitialized(root).into());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to create .zit directory: {}", zit_dir.display())
                });
            }
        }

        let config_path = zit_dir.join("config.toml");
        fs::write(&config_path, RepoConfig::TEMPLATE)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

        IndexStore::for_repo(&root).save(&Index::new())?;
        LogStore::for_repo(&root).save(&CommitLog::new())?;

        tracing::debug!(root = %root.display(), "initialized repository");

        Self::open(root)
    }

    /// Returns the repository root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .zit directory path
    pub fn zit_dir(&self) -> PathBuf {
        self.root.join(ZIT_DIR)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Author recorded on new commits
    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn log(&self) -> &CommitLog {
        &self.log
    }

    /// Records skipped while loading, with the file they came from
    pub fn corrupt_records(&self) -> &[(PathBuf, CorruptRecord)] {
        &self.corrupt
    }

    /// Returns the working tree view used for scans
    pub fn worktree(&self) -> FsWorkTree {
        FsWorkTree::new(&self.root).with_ignore(self.config.repo.ignore.iter().cloned())
    }

    /// Computes the working tree status
    pub fn status(&self) -> StatusReport {
        let tree = self.worktree();
        ChangeDetector::new(&tree).status(&self.index)
    }

    /// Stages files given as command-line arguments relative to `cwd`
    ///
    /// `.` (or any argument naming the root) selects the whole tree.
    /// Arguments that do not resolve to a file in the repository are
    /// reported in the returned issues; the rest are still staged.
    pub fn add(&mut self, cwd: &Path, args: &[String]) -> Result<AddReport> {
        let (selection, mut issues) = self.resolve_paths(cwd, args);

        let mut report = match selection {
            Some(selection) => self.stage(&selection)?,
            None => AddReport::default(),
        };

        issues.append(&mut report.issues);
        report.issues = issues;
        Ok(report)
    }

    /// Stages a selection of repo-relative paths and saves the index if it changed
    pub fn stage(&mut self, selection: &Selection) -> Result<AddReport> {
        let tree = self.worktree();
        let report = ChangeDetector::new(&tree).stage(&mut self.index, selection);
        self.index
            .mark_staged_on(report.staged.iter().map(String::as_str), self.log.head_id());

        if !report.staged.is_empty() {
            IndexStore::for_repo(&self.root).save(&self.index)?;
        }

        Ok(report)
    }

    /// Commits everything staged
    ///
    /// The log is written before the index. If the index write never
    /// happens, the next open unstages the committed files.
    pub fn commit(&mut self, message: &str, author: Option<&str>) -> Result<CommitRecord> {
        let author = author.unwrap_or(&self.author).to_string();
        let staged = self.index.staged_paths();

        let record = self.log.append(message, &author, staged)?.clone();

        LogStore::for_repo(&self.root).save(&self.log)?;

        self.index.clear_staged(record.files.iter().map(String::as_str));
        IndexStore::for_repo(&self.root).save(&self.index)?;

        tracing::debug!(id = record.id, files = record.files.len(), "recorded commit");
        Ok(record)
    }

    /// Converts command-line paths into a selection of repo-relative paths
    ///
    /// An argument naming the root becomes `""` in the selection. Returns
    /// `None` when no argument resolved to anything inside the repository.
    pub fn resolve_paths(&self, cwd: &Path, args: &[String]) -> (Option<Selection>, Vec<ScanIssue>) {
        let mut paths = Vec::new();
        let mut issues = Vec::new();
        let mut whole_tree = false;

        for arg in args {
            let absolute = normalize(&cwd.join(arg));
            match to_repo_relative(&self.root, &absolute) {
                Some(rel) if rel.is_empty() => whole_tree = true,
                Some(rel) if rel == ZIT_DIR || rel.starts_with(&format!("{}/", ZIT_DIR)) => {
                    issues.push(ScanIssue::outside(arg.as_str()));
                }
                Some(rel) => paths.push(rel),
                None => issues.push(ScanIssue::outside(arg.as_str())),
            }
        }

        // Named paths are kept next to the root so hidden files and missing
        // arguments are still handled one by one
        let selection = match (whole_tree, paths.is_empty()) {
            (true, true) => Some(Selection::All),
            (true, false) => {
                paths.insert(0, String::new());
                Some(Selection::Paths(paths))
            }
            (false, true) => None,
            (false, false) => Some(Selection::Paths(paths)),
        };

        (selection, issues)
    }
}

/// Fails with `PathNotFound` if any `add` argument did not name a file
pub fn require_paths_found(report: &AddReport) -> Result<(), RepoError> {
    let bad: Vec<String> = report.bad_arguments().map(|i| i.path.clone()).collect();
    if bad.is_empty() {
        Ok(())
    } else {
        Err(RepoError::PathNotFound(bad))
    }
}

/// Lexically resolves `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
