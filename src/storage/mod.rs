//! # Storage Layer
//!
//! Persistence layer for zit.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Index | JSONL (one `FileEntry` per line, sorted by path) | `.zit/index.jsonl` |
//! | Commits | JSONL (one `CommitRecord` per line, oldest first) | `.zit/commits.jsonl` |
//! | Config | TOML | `.zit/config.toml` |
//! | Lock | empty file, `flock`ed | `.zit/zit.lock` |
//!
//! ## Concurrency Safety
//!
//! - [`Repository`] holds an exclusive [`RepoLock`] (`fs2`) from open to drop
//! - All writes are atomic (temp file + fsync + rename)
//! - Corrupt lines are skipped with a warning on load, never fatal
//!
//! ## Key Types
//!
//! - [`Repository`] - Entry point: init, add, commit, status, log
//! - [`IndexStore`] / [`LogStore`] - Read/write the index and commit log
//! - [`Config`] - Repository and global configuration

mod jsonl;
mod index_store;
mod log_store;
mod config;
mod lock;
mod repository;

/// Name of the metadata directory at the repository root
pub const ZIT_DIR: &str = ".zit";

pub use jsonl::{CorruptRecord, JsonlFile, JsonlRead};
pub use index_store::IndexStore;
pub use log_store::LogStore;
pub use config::{platform_username, Config, ConfigError, GlobalConfig, OutputFormat, RepoConfig, AUTHOR_ENV};
pub use lock::{RepoLock, LOCK_FILE};
pub use repository::{require_paths_found, RepoError, Repository};
