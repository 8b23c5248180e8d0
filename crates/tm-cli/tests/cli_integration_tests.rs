//! Integration tests for the `tm` binary
//!
//! Each test builds a throwaway project directory with a `tidemark.yml` and
//! SQL migration files, then drives the CLI against it.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Path to the compiled tm binary
fn tm_bin() -> String {
    env!("CARGO_BIN_EXE_tm").to_string()
}

/// Run a `tm` CLI command inside `project` and return (stdout, stderr, success).
fn run_tm(project: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(tm_bin())
        .arg("--project-dir")
        .arg(project)
        .args(args)
        .env_remove("TIDEMARK_DATABASE")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute tm with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

/// Project with three migrations creating tables a, b, c.
fn sample_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("tidemark.yml"),
        "database:\n  path: db/app.duckdb\nmigrations_dir: migrations\n",
    )
    .unwrap();
    let migrations = dir.path().join("migrations");
    fs::create_dir(&migrations).unwrap();
    for (id, table) in [
        ("1700000100_create_a", "a"),
        ("1700000200_create_b", "b"),
        ("1700000300_create_c", "c"),
    ] {
        fs::write(
            migrations.join(format!("{id}.up.sql")),
            format!("CREATE TABLE {table} (id INTEGER);"),
        )
        .unwrap();
        fs::write(
            migrations.join(format!("{id}.down.sql")),
            format!("DROP TABLE {table};"),
        )
        .unwrap();
    }
    dir
}

fn status_json(project: &Path) -> serde_json::Value {
    let (stdout, stderr, ok) = run_tm(project, &["status", "--output", "json"]);
    assert!(ok, "status failed: {stderr}");
    serde_json::from_str(&stdout).unwrap()
}

fn applied_ids(project: &Path) -> Vec<String> {
    status_json(project)["migrations"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["applied"].as_bool().unwrap())
        .map(|m| m["id"].as_str().unwrap().to_string())
        .collect()
}

// ── Up ─────────────────────────────────────────────────────────────────

#[test]
fn test_up_applies_then_reports_nothing_new() {
    let project = sample_project();

    let (stdout, stderr, ok) = run_tm(project.path(), &["up"]);
    assert!(ok, "up failed: {stderr}");
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec![
            "Applied 1700000100_create_a",
            "Applied 1700000200_create_b",
            "Applied 1700000300_create_c",
        ]
    );
    assert!(project.path().join("db/app.duckdb").exists());

    let (stdout, _, ok) = run_tm(project.path(), &["up"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "No new migrations to apply.");
}

#[test]
fn test_up_failure_rolls_back_and_exits_nonzero() {
    let project = sample_project();
    fs::write(
        project
            .path()
            .join("migrations/1700000200_create_b.up.sql"),
        "CREATE TABLEX b (id INTEGER);",
    )
    .unwrap();

    let (stdout, stderr, ok) = run_tm(project.path(), &["up"]);
    assert!(!ok);
    assert!(stdout.is_empty());
    assert!(stderr.contains("[T002]"), "stderr: {stderr}");
    assert!(stderr.contains("1700000200_create_b"), "stderr: {stderr}");

    assert!(applied_ids(project.path()).is_empty());
}

#[test]
fn test_database_override_flag() {
    let project = sample_project();
    let (stdout, stderr, ok) = run_tm(project.path(), &["--database", ":memory:", "up"]);
    assert!(ok, "up failed: {stderr}");
    assert_eq!(stdout.lines().count(), 3);
    assert!(!project.path().join("db/app.duckdb").exists());
}

#[test]
fn test_up_without_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, ok) = run_tm(dir.path(), &["up"]);
    assert!(ok, "up failed: {stderr}");
    assert_eq!(stdout.trim(), "No new migrations to apply.");
    assert!(dir.path().join("tidemark.duckdb").exists());
}

// ── Down ───────────────────────────────────────────────────────────────

#[test]
fn test_down_requires_confirmation_when_not_interactive() {
    let project = sample_project();
    run_tm(project.path(), &["up"]);

    let (_, stderr, ok) = run_tm(project.path(), &["down"]);
    assert!(!ok);
    assert!(stderr.contains("--yes"), "stderr: {stderr}");
    assert_eq!(applied_ids(project.path()).len(), 3);
}

#[test]
fn test_down_reverts_latest() {
    let project = sample_project();
    run_tm(project.path(), &["up"]);

    let (stdout, stderr, ok) = run_tm(project.path(), &["down", "--yes"]);
    assert!(ok, "down failed: {stderr}");
    assert_eq!(stdout.trim(), "Reverted 1700000300_create_c");

    let (stdout, _, ok) = run_tm(project.path(), &["down", "2", "-y"]);
    assert!(ok);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["Reverted 1700000200_create_b", "Reverted 1700000100_create_a"]
    );

    let (stdout, _, ok) = run_tm(project.path(), &["down", "-y"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "No migrations to revert.");
}

#[test]
fn test_down_negative_and_all_revert_everything() {
    let project = sample_project();

    run_tm(project.path(), &["up"]);
    let (stdout, _, ok) = run_tm(project.path(), &["down", "-1", "--yes"]);
    assert!(ok);
    assert_eq!(stdout.lines().count(), 3);
    assert!(applied_ids(project.path()).is_empty());

    run_tm(project.path(), &["up"]);
    let (stdout, _, ok) = run_tm(project.path(), &["down", "--all", "--yes"]);
    assert!(ok);
    assert_eq!(stdout.lines().count(), 3);
}

#[test]
fn test_down_zero_is_noop() {
    let project = sample_project();
    run_tm(project.path(), &["up"]);
    let (stdout, _, ok) = run_tm(project.path(), &["down", "0"]);
    assert!(ok);
    assert_eq!(stdout.trim(), "No migrations to revert.");
    assert_eq!(applied_ids(project.path()).len(), 3);
}

// ── Create ─────────────────────────────────────────────────────────────

#[test]
fn test_create_writes_up_and_down_files() {
    let project = sample_project();
    let (stdout, stderr, ok) = run_tm(project.path(), &["create", "Add Email", "--yes"]);
    assert!(ok, "create failed: {stderr}");
    assert_eq!(stdout.lines().count(), 2);

    let created: Vec<String> = fs::read_dir(project.path().join("migrations"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name.contains("_add_email."))
        .collect();
    assert_eq!(created.len(), 2, "created: {created:?}");
    assert!(created.iter().any(|n| n.ends_with(".up.sql")));
    assert!(created.iter().any(|n| n.ends_with(".down.sql")));

    // The scaffolded migration is picked up and applies cleanly.
    let (stdout, stderr, ok) = run_tm(project.path(), &["up"]);
    assert!(ok, "up failed: {stderr}");
    assert!(stdout.lines().last().unwrap().ends_with("_add_email"));
}

#[test]
fn test_create_into_explicit_dir() {
    let project = sample_project();
    let target = project.path().join("elsewhere/sql");
    let (_, stderr, ok) = run_tm(
        project.path(),
        &["create", "seed data", target.to_str().unwrap(), "--yes"],
    );
    assert!(ok, "create failed: {stderr}");
    assert_eq!(fs::read_dir(&target).unwrap().count(), 2);
}

#[test]
fn test_create_rejects_unusable_name() {
    let project = sample_project();
    let (_, stderr, ok) = run_tm(project.path(), &["create", "!!!", "--yes"]);
    assert!(!ok);
    assert!(stderr.contains("[C005]"), "stderr: {stderr}");
}

// ── Status ─────────────────────────────────────────────────────────────

#[test]
fn test_status_table_output() {
    let project = sample_project();
    run_tm(project.path(), &["up"]);
    run_tm(project.path(), &["down", "--yes"]);

    let (stdout, _, ok) = run_tm(project.path(), &["status"]);
    assert!(ok);
    assert!(stdout.contains("applied"));
    assert!(stdout.contains("pending"));
    assert!(stdout.contains("2 applied, 1 pending"));
}

#[test]
fn test_status_reports_orphaned_ledger_rows() {
    let project = sample_project();
    run_tm(project.path(), &["up"]);
    fs::remove_file(project.path().join("migrations/1700000300_create_c.up.sql")).unwrap();
    fs::remove_file(project.path().join("migrations/1700000300_create_c.down.sql")).unwrap();

    let json = status_json(project.path());
    assert_eq!(json["migrations"].as_array().unwrap().len(), 2);
    let orphans = json["orphans"].as_array().unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0]["file"], "1700000300_create_c");
}

#[test]
fn test_invalid_config_is_reported() {
    let project = sample_project();
    fs::write(
        project.path().join("tidemark.yml"),
        "ledger_table: \"not valid\"\n",
    )
    .unwrap();
    let (_, stderr, ok) = run_tm(project.path(), &["status"]);
    assert!(!ok);
    assert!(stderr.contains("[C002]"), "stderr: {stderr}");
}
