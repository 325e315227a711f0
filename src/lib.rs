//! zit - A minimal local version-control tool
//!
//! zit tracks files in a working directory, stages changes by content
//! fingerprint, and records a single linear history of commits. All state
//! lives in a `.zit/` directory at the repository root.

pub mod domain;
pub mod storage;
pub mod worktree;
pub mod cli;

pub use domain::{CommitRecord, FileEntry, Fingerprint, Index, StatusReport};
pub use storage::{RepoError, Repository};
