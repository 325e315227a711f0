//! # Working Tree
//!
//! Enumeration of the files zit manages and classification of their state
//! against the index.
//!
//! - [`WorkTree`] abstracts directory walking; [`FsWorkTree`] walks the real
//!   filesystem, skipping hidden entries and the `.zit/` metadata directory
//! - [`ChangeDetector`] computes status reports and stages changes

mod walker;
mod detector;

pub use walker::{to_repo_relative, EntryKind, Files, FsWorkTree, WorkTree};
pub use detector::{ChangeDetector, Selection};
