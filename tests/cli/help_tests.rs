use super::common::replay_debug;
use predicates::prelude::*;

#[test]
fn help_lists_every_command() {
    let dir = tempfile::tempdir().unwrap();
    replay_debug(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn run_help_describes_the_specifier() {
    let dir = tempfile::tempdir().unwrap();
    replay_debug(dir.path())
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SPECIFIER"))
        .stdout(predicate::str::contains("--input"));
}
