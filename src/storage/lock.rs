//! Repository lock
//!
//! Every command holds an exclusive advisory lock (`flock` on Unix, via
//! `fs2`) on `.zit/zit.lock` for its whole load-mutate-save cycle. The lock
//! is tied to the file handle: dropping the guard, returning early with an
//! error, or the process dying all release it.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::RepoError;

/// Name of the lock file inside the metadata directory
pub const LOCK_FILE: &str = "zit.lock";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Held exclusive lock on a repository
#[derive(Debug)]
pub struct RepoLock {
    file: File,
    path: PathBuf,
}

impl RepoLock {
    /// Acquires the lock, waiting up to `timeout` for another holder to release it
    pub fn acquire(zit_dir: &Path, timeout: Duration) -> Result<Self> {
        let path = zit_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

        let start = Instant::now();
        let mut logged = false;

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Self { file, path }),
                Err(_) if start.elapsed() >= timeout => {
                    return Err(RepoError::LockTimeout(path).into());
                }
                Err(_) => {
                    if !logged {
                        tracing::debug!(lock = %path.display(), "waiting for repository lock");
                        logged = true;
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
            }
        }
    }

    /// Returns the lock file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
