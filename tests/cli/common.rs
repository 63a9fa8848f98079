use assert_cmd::Command;
use std::path::Path;

/// The binary under test, isolated from any config file in the working
/// directory or the user's config dir.
pub fn replay_debug(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("replay-debug").unwrap();
    cmd.current_dir(workdir)
        .env("XDG_CONFIG_HOME", workdir)
        .env("HOME", workdir)
        .env_remove("RUST_LOG");
    cmd
}

pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({}): {}", e, stdout))
}
