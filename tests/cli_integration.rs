//! CLI integration tests for zit
//!
//! These tests drive the `zit` binary through complete init / add /
//! commit / status / log workflows and check exit codes and on-disk state.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the zit binary, isolated from user config
fn zit_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("zit"));
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("HOME", dir)
        .env("ZIT_AUTHOR", "Test Author")
        .env_remove("ZIT_LOG");
    cmd
}

/// Create a temporary directory and initialize a zit repository
fn setup_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    zit_cmd(dir.path()).arg("init").assert().success();
    dir
}

fn write(dir: &TempDir, path: &str, content: &str) {
    let full = dir.path().join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

fn json_output(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = zit_cmd(dir.path())
        .args(args)
        .args(["--format", "json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    serde_json::from_str(&stdout).unwrap()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_metadata_store() {
    let dir = TempDir::new().unwrap();

    zit_cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized empty zit repository"));

    assert!(dir.path().join(".zit").is_dir());
    assert!(dir.path().join(".zit/config.toml").is_file());
    assert!(dir.path().join(".zit/index.jsonl").is_file());
    assert!(dir.path().join(".zit/commits.jsonl").is_file());
}

#[test]
fn test_init_twice_fails() {
    let dir = setup_repo();

    zit_cmd(dir.path())
        .arg("init")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_init_at_path() {
    let dir = TempDir::new().unwrap();

    zit_cmd(dir.path()).args(["init", "project"]).assert().success();

    assert!(dir.path().join("project/.zit").is_dir());
}

#[test]
fn test_commands_require_repository() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.txt", "hello");

    for args in [vec!["add", "a.txt"], vec!["commit", "msg"], vec!["status"], vec!["log"]] {
        zit_cmd(dir.path())
            .args(&args)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Not in a zit repository"));
    }

    assert!(!dir.path().join(".zit").exists());
}

// =============================================================================
// Add / Commit / Log Workflow
// =============================================================================

#[test]
fn test_add_commit_log_workflow() {
    let dir = setup_repo();
    write(&dir, "a.txt", "hello");

    zit_cmd(dir.path())
        .args(["add", "a.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Staged: a.txt"));

    let status = json_output(&dir, &["status"]);
    assert_eq!(status["staged"], serde_json::json!(["a.txt"]));

    zit_cmd(dir.path())
        .args(["commit", "msg"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Commit 1: msg"));

    let log = json_output(&dir, &["log"]);
    let commits = log.as_array().unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0]["id"], 1);
    assert_eq!(commits[0]["message"], "msg");
    assert_eq!(commits[0]["author"], "Test Author");
    assert_eq!(commits[0]["files"], serde_json::json!(["a.txt"]));

    let status = json_output(&dir, &["status"]);
    assert_eq!(status["staged"], serde_json::json!([]));
    assert_eq!(status["head"], 1);

    zit_cmd(dir.path())
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Commit 1: msg"))
        .stdout(predicate::str::contains("Author: Test Author"));
}

#[test]
fn test_modify_then_restage() {
    let dir = setup_repo();
    write(&dir, "a.txt", "hello");
    zit_cmd(dir.path()).args(["add", "a.txt"]).assert().success();
    zit_cmd(dir.path()).args(["commit", "first"]).assert().success();

    write(&dir, "a.txt", "world");
    let status = json_output(&dir, &["status"]);
    assert_eq!(status["modified"], serde_json::json!(["a.txt"]));
    assert_eq!(status["staged"], serde_json::json!([]));

    zit_cmd(dir.path()).args(["add", "a.txt"]).assert().success();
    let status = json_output(&dir, &["status"]);
    assert_eq!(status["modified"], serde_json::json!([]));
    assert_eq!(status["staged"], serde_json::json!(["a.txt"]));
}

#[test]
fn test_same_size_edit_is_detected() {
    let dir = setup_repo();
    write(&dir, "a.txt", "aaaa");
    zit_cmd(dir.path()).args(["add", "."]).assert().success();
    zit_cmd(dir.path()).args(["commit", "first"]).assert().success();

    write(&dir, "a.txt", "bbbb");
    let status = json_output(&dir, &["status"]);
    assert_eq!(status["modified"], serde_json::json!(["a.txt"]));
}

#[test]
fn test_commit_nothing_staged_fails() {
    let dir = setup_repo();

    zit_cmd(dir.path())
        .args(["commit", "x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Nothing staged"));

    let log = json_output(&dir, &["log"]);
    assert!(log.as_array().unwrap().is_empty());
}

#[test]
fn test_commit_ids_have_no_gaps() {
    let dir = setup_repo();

    for i in 1..=3 {
        write(&dir, "a.txt", &format!("version {}", i));
        zit_cmd(dir.path()).args(["add", "a.txt"]).assert().success();
        zit_cmd(dir.path())
            .args(["commit", &format!("c{}", i)])
            .assert()
            .success();
        // A failed commit in between must not consume an id
        zit_cmd(dir.path()).args(["commit", "empty"]).assert().code(1);
    }

    let log = json_output(&dir, &["log"]);
    let ids: Vec<u64> = log
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[test]
fn test_log_limit() {
    let dir = setup_repo();
    for i in 1..=3 {
        write(&dir, &format!("f{}.txt", i), "x");
        zit_cmd(dir.path()).args(["add", "."]).assert().success();
        zit_cmd(dir.path())
            .args(["commit", &format!("c{}", i)])
            .assert()
            .success();
    }

    let log = json_output(&dir, &["log", "--limit", "2"]);
    let messages: Vec<&str> = log
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, vec!["c3", "c2"]);
}

#[test]
fn test_log_limit_zero_with_commits() {
    let dir = setup_repo();
    write(&dir, "a.txt", "a");
    zit_cmd(dir.path()).args(["add", "a.txt"]).assert().success();
    zit_cmd(dir.path()).args(["commit", "first"]).assert().success();

    zit_cmd(dir.path())
        .args(["log", "--limit", "0"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_status_counts_staged_files_once() {
    let dir = setup_repo();
    write(&dir, "a.txt", "a");
    write(&dir, "b.txt", "b");
    zit_cmd(dir.path()).args(["add", "."]).assert().success();
    zit_cmd(dir.path()).args(["commit", "first"]).assert().success();
    write(&dir, "c.txt", "c");
    zit_cmd(dir.path()).args(["add", "c.txt"]).assert().success();

    let status = json_output(&dir, &["status"]);
    assert_eq!(status["staged"], serde_json::json!(["c.txt"]));
    assert_eq!(status["unchanged"], 2);
}

#[test]
fn test_log_empty() {
    let dir = setup_repo();

    zit_cmd(dir.path())
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("No commits yet."));
}

// =============================================================================
// Add Edge Cases
// =============================================================================

#[test]
fn test_add_missing_path_fails() {
    let dir = setup_repo();
    let index_before = fs::read(dir.path().join(".zit/index.jsonl")).unwrap();

    zit_cmd(dir.path())
        .args(["add", "missing.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.txt"));

    assert_eq!(fs::read(dir.path().join(".zit/index.jsonl")).unwrap(), index_before);
}

#[test]
fn test_add_missing_path_still_stages_others() {
    let dir = setup_repo();
    write(&dir, "a.txt", "hello");

    zit_cmd(dir.path())
        .args(["add", "missing.txt", "a.txt"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Staged: a.txt"));

    let status = json_output(&dir, &["status"]);
    assert_eq!(status["staged"], serde_json::json!(["a.txt"]));
}

#[test]
fn test_add_is_idempotent() {
    let dir = setup_repo();
    write(&dir, "a.txt", "hello");
    zit_cmd(dir.path()).args(["add", "a.txt"]).assert().success();
    let index_before = fs::read(dir.path().join(".zit/index.jsonl")).unwrap();

    zit_cmd(dir.path())
        .args(["add", "a.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to stage"));

    assert_eq!(fs::read(dir.path().join(".zit/index.jsonl")).unwrap(), index_before);
}

#[test]
fn test_add_dot_skips_hidden_and_metadata() {
    let dir = setup_repo();
    write(&dir, "a.txt", "a");
    write(&dir, "src/lib.rs", "lib");
    write(&dir, ".secret", "s");

    let report = json_output(&dir, &["add", "."]);
    assert_eq!(report["staged"], serde_json::json!(["a.txt", "src/lib.rs"]));
}

#[test]
fn test_add_dot_with_missing_path_fails() {
    let dir = setup_repo();
    write(&dir, "a.txt", "a");

    zit_cmd(dir.path())
        .args(["add", ".", "missing.txt"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Staged: a.txt"))
        .stderr(predicate::str::contains("missing.txt"));
}

#[test]
fn test_add_dot_with_named_hidden_file() {
    let dir = setup_repo();
    write(&dir, "a.txt", "a");
    write(&dir, ".env", "A=1");

    let report = json_output(&dir, &["add", ".", ".env"]);
    assert_eq!(report["staged"], serde_json::json!([".env", "a.txt"]));
}

#[test]
fn test_verbose_status_prints_summary() {
    let dir = setup_repo();
    write(&dir, "a.txt", "a");

    zit_cmd(dir.path())
        .args(["status", "--verbose"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "[verbose:status] 1 new, 0 modified, 0 staged, 0 deleted",
        ));
}

#[test]
fn test_add_from_subdirectory() {
    let dir = setup_repo();
    write(&dir, "src/lib.rs", "lib");
    write(&dir, "top.txt", "top");

    zit_cmd(&dir.path().join("src"))
        .args(["add", "lib.rs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Staged: src/lib.rs"));

    let status = json_output(&dir, &["status"]);
    assert_eq!(status["staged"], serde_json::json!(["src/lib.rs"]));
    assert_eq!(status["new"], serde_json::json!(["top.txt"]));
}

// =============================================================================
// Status Tests
// =============================================================================

#[test]
fn test_status_text_report() {
    let dir = setup_repo();
    write(&dir, "new.txt", "n");

    zit_cmd(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No commits yet"))
        .stdout(predicate::str::contains("New (1):"))
        .stdout(predicate::str::contains("new.txt"));
}

#[test]
fn test_status_reports_deleted() {
    let dir = setup_repo();
    write(&dir, "a.txt", "a");
    zit_cmd(dir.path()).args(["add", "a.txt"]).assert().success();
    zit_cmd(dir.path()).args(["commit", "add a"]).assert().success();

    fs::remove_file(dir.path().join("a.txt")).unwrap();
    let status = json_output(&dir, &["status"]);
    assert_eq!(status["deleted"], serde_json::json!(["a.txt"]));
}

#[test]
fn test_corrupt_index_line_is_skipped() {
    let dir = setup_repo();
    write(&dir, "a.txt", "a");
    zit_cmd(dir.path()).args(["add", "a.txt"]).assert().success();

    let index_path = dir.path().join(".zit/index.jsonl");
    let mut content = fs::read_to_string(&index_path).unwrap();
    content.push_str("this is not json\n");
    fs::write(&index_path, content).unwrap();

    zit_cmd(dir.path())
        .arg("status")
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping corrupt record"));

    let status = json_output(&dir, &["status"]);
    assert_eq!(status["staged"], serde_json::json!(["a.txt"]));
    assert_eq!(status["corrupt_records"], 1);
}

#[test]
fn test_commit_after_largest_id_fails_cleanly() {
    let dir = setup_repo();
    fs::write(
        dir.path().join(".zit/commits.jsonl"),
        "{\"id\":18446744073709551615,\"message\":\"last\",\"author\":\"a\",\"timestamp\":\"2024-01-01T00:00:00Z\",\"files\":[\"f\"]}\n",
    )
    .unwrap();
    write(&dir, "a.txt", "a");
    zit_cmd(dir.path()).args(["add", "a.txt"]).assert().success();

    zit_cmd(dir.path())
        .args(["commit", "next"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Commit id space exhausted"));

    let log = json_output(&dir, &["log"]);
    assert_eq!(log.as_array().unwrap().len(), 1);
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_author_from_repo_config() {
    let dir = setup_repo();
    fs::write(dir.path().join(".zit/config.toml"), "author = \"Config Author\"\n").unwrap();
    write(&dir, "a.txt", "a");
    zit_cmd(dir.path()).args(["add", "a.txt"]).assert().success();

    zit_cmd(dir.path())
        .env_remove("ZIT_AUTHOR")
        .args(["commit", "msg"])
        .assert()
        .success();

    let log = json_output(&dir, &["log"]);
    assert_eq!(log[0]["author"], "Config Author");
}

#[test]
fn test_author_flag_overrides() {
    let dir = setup_repo();
    write(&dir, "a.txt", "a");
    zit_cmd(dir.path()).args(["add", "a.txt"]).assert().success();

    zit_cmd(dir.path())
        .args(["commit", "msg", "--author", "Flag Author"])
        .assert()
        .success();

    let log = json_output(&dir, &["log"]);
    assert_eq!(log[0]["author"], "Flag Author");
}

#[test]
fn test_ignored_names_from_config() {
    let dir = setup_repo();
    fs::write(dir.path().join(".zit/config.toml"), "ignore = [\"target\"]\n").unwrap();
    write(&dir, "a.txt", "a");
    write(&dir, "target/out.bin", "bin");

    let status = json_output(&dir, &["status"]);
    assert_eq!(status["new"], serde_json::json!(["a.txt"]));
}
