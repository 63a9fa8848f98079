use super::common::{replay_debug, stdout_json};
use predicates::prelude::*;

#[test]
fn inspect_shows_closure_with_cycles_collapsed() {
    let dir = tempfile::tempdir().unwrap();
    let output = replay_debug(dir.path())
        .args(["inspect", "demo.user.UserController#getUser(long)", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let doc = stdout_json(&output);

    let modules: Vec<&str> = doc["modules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_str().unwrap())
        .collect();
    assert_eq!(modules[0], "demo/user/UserController.mod");
    assert!(modules.contains(&"demo/user/User.mod"));
    assert!(modules.contains(&"demo/user/Team.mod"));
    assert_eq!(modules.iter().filter(|m| **m == "demo/user/User.mod").count(), 1);
    assert_eq!(doc["strategy"], "container");
    assert_eq!(doc["exactOperation"], "getUser(long)");
    assert_eq!(doc["descriptor"]["parameterTypeNames"], serde_json::json!(["long"]));
}

#[test]
fn inspect_without_target_lists_types() {
    let dir = tempfile::tempdir().unwrap();
    replay_debug(dir.path())
        .arg("inspect")
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo.util.Sample"))
        .stdout(predicate::str::contains("demo.user.UserController [RestController]"));
}
