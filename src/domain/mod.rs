//! Domain models for zit
//!
//! Contains the core version-control state without any I/O concerns.

mod fingerprint;
mod index;
mod commit;
mod status;

pub use fingerprint::{Fingerprint, FingerprintError, FINGERPRINT_LEN};
pub use index::{FileEntry, Index};
pub use commit::{CommitError, CommitLog, CommitRecord};
pub use status::{AddReport, FileStatus, IssueKind, ScanIssue, StatusReport};
