//! End-to-end tests of the beatfetch binary surface.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn help_describes_the_tool() {
    Command::cargo_bin("beatfetch")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("beatmap"))
        .stdout(predicate::str::contains("--min-stars"))
        .stdout(predicate::str::contains("--max-stars"));
}

#[test]
fn version_flag_prints_version() {
    Command::cargo_bin("beatfetch")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_credentials_fail_before_any_network_call() {
    // Run in an empty directory so no .env can supply credentials.
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("beatfetch")
        .unwrap()
        .current_dir(temp.path())
        .env_remove("OSU_CLIENT_ID")
        .env_remove("OSU_CLIENT_SECRET")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OSU_CLIENT_ID"));
}

#[test]
fn zero_limit_is_rejected_by_arg_parsing() {
    Command::cargo_bin("beatfetch")
        .unwrap()
        .args(["--limit", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
