use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

fn valid_state_json() -> &'static str {
    r#"
{
  "alarms": [
    {
      "id": "1700000000000-1",
      "message": "farm",
      "time": "2099-02-07T07:30:00+01:00",
      "isActive": true,
      "duration": 600000,
      "keep": false
    },
    {
      "id": "1700000000000-2",
      "message": "trade",
      "time": "2099-02-07T08:00:00+01:00",
      "isActive": false,
      "keep": true
    }
  ],
  "commandHistory": ["farm in 10m", "trade in 15m keep"]
}
"#
}

#[test]
fn check_succeeds_with_valid_state_file() {
    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("zeno_data.json");
    fs::write(&data, valid_state_json()).expect("write json");

    let mut cmd = cargo_bin_cmd!("zeno");
    cmd.arg("--check")
        .arg("--data")
        .arg(data)
        .assert()
        .success()
        .stdout(predicate::str::contains("state file OK: 2 alarm(s)"));
}

#[test]
fn check_reports_history_count() {
    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("zeno_data.json");
    fs::write(&data, valid_state_json()).expect("write json");

    let mut cmd = cargo_bin_cmd!("zeno");
    cmd.arg("--check")
        .arg("--data")
        .arg(data)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 history entries"));
}

#[test]
fn check_fails_on_malformed_json() {
    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("zeno_data.json");
    fs::write(&data, "{ not-valid-json ").expect("write invalid json");

    let mut cmd = cargo_bin_cmd!("zeno");
    cmd.arg("--check")
        .arg("--data")
        .arg(data)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn check_accepts_a_missing_state_file() {
    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("absent.json");

    let mut cmd = cargo_bin_cmd!("zeno");
    cmd.arg("--check")
        .arg("--data")
        .arg(data)
        .assert()
        .success()
        .stdout(predicate::str::contains("empty defaults"));
}

#[test]
fn check_accepts_an_empty_object() {
    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("zeno_data.json");
    fs::write(&data, "{}").expect("write json");

    let mut cmd = cargo_bin_cmd!("zeno");
    cmd.arg("--check")
        .arg("--data")
        .arg(data)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 alarm(s)"));
}
