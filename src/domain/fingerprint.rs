//! Content fingerprints
//!
//! A fingerprint is a 256-bit BLAKE3 digest of a file's full content.
//! Metadata (size, mtime, permissions) never takes part in it, so a file
//! that is touched but not changed keeps its fingerprint and two files of
//! the same size with different bytes never share one.
//!
//! Fingerprints serialize as 64 lowercase hex characters.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a fingerprint in bytes
pub const FINGERPRINT_LEN: usize = blake3::OUT_LEN;

#[derive(Debug, Error, PartialEq)]
pub enum FingerprintError {
    #[error("Invalid fingerprint: expected 64 hex characters, got '{0}'")]
    InvalidHex(String),
}

/// Digest of a file's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Computes the fingerprint of an in-memory buffer
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Streams a file through the digest without loading it whole
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut hasher = blake3::Hasher::new();
        io::copy(&mut file, &mut hasher)?;
        Ok(Self(*hasher.finalize().as_bytes()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash =
            blake3::Hash::from_hex(s).map_err(|_| FingerprintError::InvalidHex(s.to_string()))?;
        Ok(Self(*hash.as_bytes()))
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = FingerprintError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.to_string()
    }
}
