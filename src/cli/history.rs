//! History commands: commit and log

use anyhow::Result;
use chrono::Local;

use super::output::Output;
use crate::domain::CommitRecord;
use crate::storage::Repository;

pub fn commit(output: &Output, message: &str, author: Option<&str>) -> Result<()> {
    let mut repo = Repository::open_current()?;
    let record = repo.commit(message, author)?;

    if output.is_json() {
        output.data(&record);
    } else {
        output.success(&format!(
            "Commit {}: {} ({} file{})",
            record.id,
            record.message,
            record.files.len(),
            if record.files.len() == 1 { "" } else { "s" }
        ));
    }

    Ok(())
}

pub fn log(output: &Output, limit: Option<usize>) -> Result<()> {
    let repo = Repository::open_current()?;
    let commits: Vec<&CommitRecord> = repo
        .log()
        .iter_recent()
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    if output.is_json() {
        output.data(&commits);
        return Ok(());
    }

    if repo.log().is_empty() {
        println!("No commits yet.");
        return Ok(());
    }

    for (i, record) in commits.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "Commit {}: {} ({})",
            record.id,
            record.message,
            record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
        println!("  Author: {}", record.author);
        println!("  Files:  {}", record.files.join(", "));
    }

    Ok(())
}
