use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_scorewatch_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("scorewatch")
}

#[test]
fn test_scrape_command_help() {
    let mut cmd = Command::new(get_scorewatch_bin());
    cmd.arg("scrape").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Scrape live matches once"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--no-live"))
        .stdout(predicate::str::contains("--concurrency"))
        .stdout(predicate::str::contains("--chrome-path"));
}

#[test]
fn test_scrape_with_missing_chrome_fails() {
    let mut cmd = Command::new(get_scorewatch_bin());
    cmd.env_remove("CHROME_PATH")
        .arg("scrape")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Chrome not found"));
}

#[test]
fn test_scrape_rejects_invalid_url() {
    let mut cmd = Command::new(get_scorewatch_bin());
    cmd.arg("scrape")
        .arg("not a url")
        .arg("--chrome-path")
        .arg("/nonexistent/chrome");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid URL"));
}

#[test]
fn test_scrape_rejects_unknown_format() {
    let mut cmd = Command::new(get_scorewatch_bin());
    cmd.arg("scrape").arg("--format").arg("xml");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
