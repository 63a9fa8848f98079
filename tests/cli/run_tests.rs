use super::common::{replay_debug, stdout_json};
use predicates::prelude::*;

#[test]
fn run_prints_steps() {
    let dir = tempfile::tempdir().unwrap();
    replay_debug(dir.path())
        .args(["run", "demo.user.UserController#getUser(long)", "--input", "1"])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo.user.UserController#getUser"))
        .stdout(predicate::str::contains("demo.user.UserRepository#findById"))
        .stdout(predicate::str::contains("completed"));
}

#[test]
fn run_json_reports_the_root_step() {
    let dir = tempfile::tempdir().unwrap();
    let output = replay_debug(dir.path())
        .args([
            "--quiet",
            "run",
            "demo.util.Sample#echo(long)",
            "--input",
            "5",
            "--output",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc = stdout_json(&output);
    assert_eq!(doc["success"], true);
    assert_eq!(doc["step"]["arguments"], serde_json::json!([5]));
    assert_eq!(doc["step"]["returnValue"], 5);
}

#[test]
fn keep_root_record_adds_the_intercepted_root() {
    let dir = tempfile::tempdir().unwrap();
    let output = replay_debug(dir.path())
        .args([
            "--quiet",
            "run",
            "demo.user.UserController#count",
            "--keep-root-record",
            "--output",
            "json",
        ])
        .output()
        .unwrap();
    let doc = stdout_json(&output);
    assert_eq!(doc["steps"].as_array().unwrap().len(), 4);
}

#[test]
fn config_file_can_disable_root_dedupe() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "[sandbox]\ndedupe_root_step = false\n").unwrap();
    let output = replay_debug(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["--quiet", "run", "demo.user.UserController#count", "--output", "json"])
        .output()
        .unwrap();
    let doc = stdout_json(&output);
    assert_eq!(doc["steps"].as_array().unwrap().len(), 4);
}

#[test]
fn bare_word_input_is_text() {
    let dir = tempfile::tempdir().unwrap();
    let output = replay_debug(dir.path())
        .args([
            "--quiet",
            "run",
            "demo.util.Sample#greet(String)",
            "--input",
            "ada",
            "--output",
            "json",
        ])
        .output()
        .unwrap();
    let doc = stdout_json(&output);
    assert_eq!(doc["step"]["returnValue"], "Hello, ada!");
}
