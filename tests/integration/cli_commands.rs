//! Integration tests driving the coursekit binary

use coursekit::store::{SdkStore, TREE_META_DATA};
use serde_json::json;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the binary against `workspace` with the user config directories isolated.
fn run(workspace: &Path, home: &TempDir, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_coursekit"));
    cmd.arg("--workspace")
        .arg(workspace)
        .args(args)
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("COURSEKIT__API__API_TOKEN")
        .env_remove("COURSEKIT__API__USER_TOKEN");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn context_show_without_active_course() {
    let workspace = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    let output = run(workspace.path(), &home, &["context", "show"], &[]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No active course."));
    assert!(workspace.path().join(".coursekit/store").exists());
}

#[test]
fn config_show_masks_tokens() {
    let workspace = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    let output = run(
        workspace.path(),
        &home,
        &["config", "show"],
        &[("COURSEKIT__API__API_TOKEN", "secret")],
    );
    assert!(output.status.success());
    let shown = stdout(&output);
    assert!(shown.contains("********"));
    assert!(!shown.contains("secret"));
    assert!(shown.contains("end_event_validation_delay_ms"));
}

#[test]
fn invalid_config_fails_with_message() {
    let workspace = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    let output = run(
        workspace.path(),
        &home,
        &["context", "show"],
        &[("COURSEKIT__API__BASE_URL", "not-a-url")],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("base_url"));
}

#[test]
fn validate_export_accepts_profile_export() {
    let workspace = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let export = TempDir::new().unwrap();
    let export_path = export.path().join("profiles.db");
    {
        let store = SdkStore::open(&export_path).unwrap();
        store
            .open_tree(TREE_META_DATA)
            .unwrap()
            .put("0", &json!({ "version": 20, "types": ["userprofile"] }))
            .unwrap();
        store.flush().unwrap();
    }

    let output = run(
        workspace.path(),
        &home,
        &["validate-export", export_path.to_str().unwrap()],
        &[],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("Export accepted"));
}

#[test]
fn validate_export_reports_missing_path_without_creating_it() {
    let workspace = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let missing = workspace.path().join("typo.db");

    let output = run(
        workspace.path(),
        &home,
        &["validate-export", missing.to_str().unwrap()],
        &[],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
    assert!(!missing.exists());
}

#[test]
fn ingest_counts_processed_and_unparseable_lines() {
    let workspace = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    let events = workspace.path().join("events.jsonl");
    std::fs::write(
        &events,
        [
            r#"{"eid":"INTERACT","actor":{"id":"u1"}}"#,
            "not json",
            "",
            r#"{"eid":"END","actor":{"id":"u1"},"object":{"id":"co1","type":"Course"}}"#,
        ]
        .join("\n"),
    )
    .unwrap();

    let output = run(
        workspace.path(),
        &home,
        &["ingest", events.to_str().unwrap()],
        &[],
    );
    assert!(output.status.success());
    let summary = stdout(&output);
    assert!(summary.contains("Processed 2 event(s), 0 failed, 1 unparseable line(s)"));
    assert!(summary.contains("No bus events published."));

    let output = run(workspace.path(), &home, &["context", "show"], &[]);
    assert!(stdout(&output).contains("No active course."));
}

#[test]
fn channel_lookup_against_unreachable_server_fails() {
    let workspace = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    let output = run(
        workspace.path(),
        &home,
        &["channel", "c1", "--from", "server"],
        &[("COURSEKIT__API__BASE_URL", "http://127.0.0.1:9")],
    );
    assert!(!output.status.success());
}
