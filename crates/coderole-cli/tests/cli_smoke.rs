//! CLI binary smoke tests using assert_cmd.
//!
//! These tests exercise the compiled `coderole` binary to verify that
//! argument parsing, help text, and error handling work end-to-end.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("coderole").unwrap()
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("preprocess"))
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("classify"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("coderole"));
}

// ---------------------------------------------------------------------------
// Preprocess subcommand
// ---------------------------------------------------------------------------

#[test]
fn preprocess_no_config_prints_template() {
    cmd()
        .arg("preprocess")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source_dir\""))
        .stdout(predicate::str::contains("\"test_ratio\""))
        .stderr(predicate::str::contains("No config file provided"));
}

#[test]
fn preprocess_nonexistent_config_errors() {
    cmd()
        .args(["preprocess", "/nonexistent/config.json"])
        .assert()
        .failure();
}

#[test]
fn preprocess_missing_source_dir_errors() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["preprocess", "-s", "/nonexistent/raw", "-o"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Directory does not exist"));
}

// ---------------------------------------------------------------------------
// Train subcommand
// ---------------------------------------------------------------------------

#[test]
fn train_no_config_prints_template() {
    cmd()
        .arg("train")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"model_type\""))
        .stdout(predicate::str::contains("\"model_params\""))
        .stdout(predicate::str::contains("\"training_data\""))
        .stderr(predicate::str::contains("No config file provided"));
}

#[test]
fn train_nonexistent_config_errors() {
    cmd()
        .args(["train", "/nonexistent/config.json"])
        .assert()
        .failure();
}

#[test]
fn train_rejects_unknown_model_type() {
    cmd()
        .args(["train", "-t", "a.json", "-m", "knn"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("knn"));
}

#[test]
fn train_missing_training_file_errors() {
    cmd()
        .args(["train", "-t", "/nonexistent/training.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist"));
}

// ---------------------------------------------------------------------------
// Classify subcommand
// ---------------------------------------------------------------------------

#[test]
fn classify_requires_model_and_files() {
    cmd().arg("classify").assert().failure();
}

#[test]
fn classify_missing_model_errors() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("A.php");
    std::fs::write(&file, "<?php class A {}").unwrap();
    cmd()
        .args(["classify", "-m", "/nonexistent/model.bin"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Model file not found"));
}
