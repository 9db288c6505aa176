//! CLI tests for the dgit binary
//!
//! These only exercise commands that need no network or git remote.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn dgit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dgit").unwrap();
    cmd.arg("--no-color")
        .arg("-C")
        .arg(dir.path())
        .env_remove("PINATA_API_KEY")
        .env_remove("PINATA_SECRET_API_KEY")
        .env_remove("DGIT_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("dgit")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("submodules"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("pin"));
}

#[test]
fn test_usage_of_empty_tree() {
    let dir = TempDir::new().unwrap();

    dgit(&dir)
        .arg("usage")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.00 KB used of 10000.00 KB"));
}

#[test]
fn test_set_item_then_get_item() {
    let dir = TempDir::new().unwrap();

    dgit(&dir)
        .args(["set-item", "editor", "vim"])
        .assert()
        .success();
    assert!(dir.path().join(".dgit").join("settings.json").exists());

    dgit(&dir)
        .args(["get-item", "editor"])
        .assert()
        .success()
        .stdout("vim\n");
}

#[test]
fn test_get_missing_item_fails() {
    let dir = TempDir::new().unwrap();

    dgit(&dir)
        .args(["get-item", "absent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No value stored for 'absent'"));
}

#[test]
fn test_import_is_blocked_when_storage_is_full() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".dgit")).unwrap();
    fs::write(
        dir.path().join(".dgit").join("config.yml"),
        "quota_threshold_kb: 0.0\n",
    )
    .unwrap();

    dgit(&dir)
        .args(["set-item", "cache", "some data"])
        .assert()
        .success();

    dgit(&dir)
        .args(["import", "QmWhatever"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Local storage is full"));
}

#[test]
fn test_set_gateway_rejects_invalid_endpoint() {
    let dir = TempDir::new().unwrap();

    dgit(&dir)
        .args(["set-gateway", "not a url"])
        .assert()
        .failure();
    assert!(!dir.path().join(".dgit").join("config.yml").exists());
}

#[test]
fn test_pin_requires_credentials() {
    let dir = TempDir::new().unwrap();

    dgit(&dir)
        .arg("pin")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--api-key"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join(".dgit")).unwrap();
    fs::write(
        dir.path().join(".dgit").join("config.yml"),
        "import_timeout_secs: 0\n",
    )
    .unwrap();

    dgit(&dir).arg("usage").assert().failure();
}
