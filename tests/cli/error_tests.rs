use super::common::{replay_debug, stdout_json};
use predicates::prelude::*;

#[test]
fn unknown_type_fails_with_message() {
    let dir = tempfile::tempdir().unwrap();
    replay_debug(dir.path())
        .args(["--quiet", "run", "demo.util.Nope#echo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Type not found: demo.util.Nope"));
}

#[test]
fn json_failure_document_is_still_printed() {
    let dir = tempfile::tempdir().unwrap();
    let output = replay_debug(dir.path())
        .args(["--quiet", "run", "demo.util.Nope#echo", "--output", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let doc = stdout_json(&output);
    assert_eq!(doc["success"], false);
    assert!(doc.get("sessionId").is_none());
}

#[test]
fn malformed_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("replay-debugger.toml"),
        "[sandbox]\nmax_module_bytes = \"big\"\n",
    )
    .unwrap();
    replay_debug(dir.path())
        .args(["--quiet", "run", "demo.util.Sample#echo(long)", "--input", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sandbox.max_module_bytes"));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    replay_debug(dir.path()).assert().failure().code(2);
}
