//! JSONL record files
//!
//! Both the index and the commit log are stored with one JSON object per
//! line. Reads are lenient: a line that fails to parse is skipped with a
//! warning so a single damaged record never makes the repository unusable.
//! Writes replace the whole file atomically (temp file + fsync + rename).

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A line that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptRecord {
    /// 1-based line number
    pub line: usize,
    pub error: String,
}

/// Records read from a JSONL file, plus the lines that were skipped
#[derive(Debug)]
pub struct JsonlRead<T> {
    pub records: Vec<T>,
    pub corrupt: Vec<CorruptRecord>,
}

/// A file of newline-delimited JSON records of type `T`
pub struct JsonlFile<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// Returns the path to the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the temp file used during atomic writes
    pub fn temp_path(&self) -> PathBuf {
        self.path.with_extension("jsonl.tmp")
    }

    /// Reads every record, skipping malformed lines
    ///
    /// A missing file reads as empty.
    pub fn read_all(&self) -> Result<JsonlRead<T>> {
        let mut read = JsonlRead {
            records: Vec::new(),
            corrupt: Vec::new(),
        };

        if !self.path.exists() {
            return Ok(read);
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let reader = BufReader::new(file);

        for (line_num, line) in reader.split(b'\n').enumerate() {
            let line = line.with_context(|| {
                format!("Failed to read line {} of {}", line_num + 1, self.path.display())
            })?;

            if line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }

            match serde_json::from_slice::<T>(&line) {
                Ok(record) => read.records.push(record),
                Err(e) => {
                    tracing::warn!(
                        file = %self.path.display(),
                        line = line_num + 1,
                        error = %e,
                        "skipping corrupt record"
                    );
                    read.corrupt.push(CorruptRecord {
                        line: line_num + 1,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(read)
    }

    /// Replaces the file with the given records
    ///
    /// The previous file stays in place until the new content is fully
    /// written and synced.
    pub fn write_all<'a, I>(&self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.temp_path();

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            let mut writer = BufWriter::new(&file);

            for record in records {
                let line = serde_json::to_string(record).context("Failed to serialize record")?;
                writeln!(writer, "{}", line).context("Failed to write record")?;
            }

            writer.flush().context("Failed to flush records")?;
            drop(writer);
            file.sync_all()
                .with_context(|| format!("Failed to sync {}", temp_path.display()))?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}
