//! Staging commands: add and status

use anyhow::{Context, Result};

use super::output::Output;
use crate::storage::{require_paths_found, Repository};

pub fn add(output: &Output, paths: &[String]) -> Result<()> {
    let mut repo = Repository::open_current()?;
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    let report = repo.add(&cwd, paths)?;
    output.verbose_ctx(
        "add",
        &format!("{} staged, {} unchanged", report.staged.len(), report.unchanged.len()),
    );

    if output.is_json() {
        output.data(&report);
    } else {
        for path in &report.staged {
            println!("Staged: {}", path);
        }
        if output.is_verbose() {
            for path in &report.unchanged {
                output.verbose_ctx("add", &format!("unchanged: {}", path));
            }
        }
        if report.staged.is_empty() && report.issues.is_empty() {
            println!("Nothing to stage");
        }
        output.issues(&report.issues);
    }

    require_paths_found(&report)?;
    Ok(())
}

pub fn status(output: &Output) -> Result<()> {
    let repo = Repository::open_current()?;
    let report = repo.status();
    output.verbose_ctx("status", &report.brief());

    if output.is_json() {
        output.data(&serde_json::json!({
            "head": repo.log().head().map(|c| c.id),
            "staged": report.staged,
            "modified": report.modified,
            "new": report.new,
            "deleted": report.deleted,
            "unchanged": report.unchanged,
            "issues": report.issues,
            "corrupt_records": repo.corrupt_records().len(),
        }));
        return Ok(());
    }

    match repo.log().head() {
        Some(head) => println!("On commit {}: {}", head.id, head.message),
        None => println!("No commits yet"),
    }
    println!();

    print_section("Staged", &report.staged);
    print_section("Modified", &report.modified);
    print_section("New", &report.new);
    if !report.deleted.is_empty() {
        print_section("Deleted", &report.deleted);
    }

    if report.is_clean() {
        println!("Working tree clean ({} tracked)", repo.index().len());
    }

    output.issues(&report.issues);
    Ok(())
}

fn print_section(title: &str, paths: &[String]) {
    println!("{} ({}):", title, paths.len());
    for path in paths {
        println!("  {}", path);
    }
}
