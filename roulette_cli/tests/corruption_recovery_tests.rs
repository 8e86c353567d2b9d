//! Corruption recovery tests for the roulette binary.
//!
//! A damaged exercise store must be reported, never silently replaced.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("roulette"));
    cmd.arg("--data-dir")
        .arg(data_dir)
        .arg("--config")
        .arg(data_dir.join("config.toml"));
    cmd
}

fn setup_test_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::write(dir.path().join("config.toml"), "[session]\nspin_delay_ms = 0\n")
        .expect("Failed to write config");
    dir
}

#[test]
fn test_corrupted_store_is_reported() {
    let temp_dir = setup_test_dir();
    let store = temp_dir.path().join("exercises.json");
    fs::write(&store, "{ invalid json }}}}").expect("Failed to write corrupted store");

    cli(temp_dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Storage"));
}

#[test]
fn test_corrupted_store_is_not_overwritten_by_add() {
    let temp_dir = setup_test_dir();
    let store = temp_dir.path().join("exercises.json");
    fs::write(&store, "[{ truncated").expect("Failed to write corrupted store");

    cli(temp_dir.path())
        .args(["add", "--name", "Pompes", "--tag", "bras"])
        .assert()
        .failure();

    assert_eq!(fs::read_to_string(&store).unwrap(), "[{ truncated");
}

#[test]
fn test_empty_store_file_is_empty_catalog() {
    let temp_dir = setup_test_dir();
    fs::write(temp_dir.path().join("exercises.json"), "").unwrap();

    cli(temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No exercises yet"));
}

#[test]
fn test_legacy_records_load_as_reps() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("exercises.json"),
        r#"[{"id":"legacy-1","name":"Pompes","tag":"bras","difficulty":"moyen"}]"#,
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("6-9 reps"));
}

#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = setup_test_dir();
    fs::write(
        temp_dir.path().join("config.toml"),
        "[session]\ncountdown_tick_ms = 0\n",
    )
    .unwrap();

    cli(temp_dir.path()).arg("list").assert().failure();
}
