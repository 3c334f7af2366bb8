use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn fareclaim(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fareclaim").unwrap();
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("fareclaim")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("submit"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_show_defaults() {
    let dir = tempfile::tempdir().unwrap();

    fareclaim(&dir.path().join("config.json"))
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"amount_field\": \"claim-amount\""))
        .stdout(predicate::str::contains("\"processing_keyword\": \"rocessed\""));
}

#[test]
fn test_config_init_set_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.json");

    fareclaim(&config).args(["config", "init"]).assert().success();
    assert!(config.exists());

    fareclaim(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    fareclaim(&config)
        .args(["config", "set", "portal.claims_url", "https://claims.example/fuel"])
        .assert()
        .success();
    fareclaim(&config)
        .args(["config", "set", "submission.timeout_secs", "15"])
        .assert()
        .success();

    fareclaim(&config)
        .args(["config", "get", "portal.claims_url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"https://claims.example/fuel\""));
    fareclaim(&config)
        .args(["config", "get", "submission.timeout_secs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("15"));

    fareclaim(&config)
        .args(["config", "get", "portal.nope"])
        .assert()
        .failure();
}

#[test]
fn test_scan_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();

    fareclaim(&dir.path().join("config.json"))
        .args(["scan"])
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Receipts directory not found"));
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let receipts = dir.path().join("receipts");
    fs::create_dir(&receipts).unwrap();

    fareclaim(&dir.path().join("config.json"))
        .arg("scan")
        .arg(&receipts)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"receipts\": []"));
}

#[test]
fn test_scan_reports_corrupt_receipt() {
    let dir = tempfile::tempdir().unwrap();
    let receipts = dir.path().join("receipts");
    fs::create_dir(&receipts).unwrap();
    fs::write(receipts.join("broken.pdf"), b"definitely not a pdf").unwrap();
    fs::write(receipts.join("notes.txt"), b"ignored").unwrap();

    fareclaim(&dir.path().join("config.json"))
        .arg("scan")
        .arg(&receipts)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"amount\": \"Error\""))
        .stdout(predicate::str::contains("File reading error"))
        .stdout(predicate::str::contains("notes.txt").not())
        .stderr(predicate::str::contains("1 unreadable"));
}

#[test]
fn test_scan_csv_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let receipts = dir.path().join("receipts");
    fs::create_dir(&receipts).unwrap();
    fs::write(receipts.join("broken.pdf"), b"garbage").unwrap();
    let output = dir.path().join("receipts.csv");

    fareclaim(&dir.path().join("config.json"))
        .arg("scan")
        .arg(&receipts)
        .args(["--format", "csv", "--output"])
        .arg(&output)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("path,amount,date,source,destination"));
    assert!(csv.contains("Error"));
}

#[test]
fn test_submit_requires_portal_url() {
    let dir = tempfile::tempdir().unwrap();

    fareclaim(&dir.path().join("config.json"))
        .arg("submit")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("portal.claims_url"));
}

#[test]
fn test_submit_mobile_requires_mobile_url() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    fareclaim(&config)
        .args(["config", "set", "portal.claims_url", "https://claims.example/fuel"])
        .assert()
        .success();

    fareclaim(&config)
        .arg("submit")
        .arg(dir.path())
        .args(["--phone", "9876543210"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("portal.mobile_url"));
}

#[test]
fn test_submit_without_claimable_receipts_needs_no_browser() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    let receipts = dir.path().join("receipts");
    fs::create_dir(&receipts).unwrap();
    fs::write(receipts.join("broken.pdf"), b"garbage").unwrap();

    fareclaim(&config)
        .args(["config", "set", "portal.claims_url", "https://claims.example/fuel"])
        .assert()
        .success();

    fareclaim(&config)
        .arg("submit")
        .arg(&receipts)
        .args(["--webdriver-url", "http://127.0.0.1:9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No receipts with a readable amount"));

    assert!(receipts.join("broken.pdf").exists());
}

#[test]
fn test_config_set_digit_only_phone_number() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    fareclaim(&config)
        .args(["config", "set", "portal.phone_number", "9876543210"])
        .assert()
        .success();

    fareclaim(&config)
        .args(["config", "get", "portal.phone_number"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"9876543210\""));
}
