use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

pub fn new_command_with_temp_home() -> (Command, tempfile::TempDir) {
    let temp_home = tempfile::tempdir().expect("temp home");
    let command = command_in(temp_home.path());
    (command, temp_home)
}

pub fn command_in(home: &Path) -> Command {
    let binary = assert_cmd::cargo::cargo_bin!("mide");
    let mut command = Command::new(binary);
    command.env("HOME", home);
    command.env("XDG_CONFIG_HOME", home.join(".config"));
    command.env_remove("RUST_LOG");
    command
}

pub fn config_dir(home: &Path) -> PathBuf {
    home.join(".config").join("mide")
}

pub fn write_config(home: &Path, contents: &str) {
    let dir = config_dir(home);
    fs::create_dir_all(&dir).expect("create config dir");
    fs::write(dir.join("config.toml"), contents).expect("write config");
}

pub fn write_valid_config(home: &Path) {
    write_config(
        home,
        r#"
version = 1

[logging]
level = "warn"

[[validation.rules]]
step = 1
attendee_type = "school"
required = ["center_name"]
"#,
    );
}

/// Runs `mide` with the given arguments and expects success.
pub fn run_ok(home: &Path, args: &[&str]) -> String {
    let output = command_in(home).args(args).output().expect("run mide");
    assert!(
        output.status.success(),
        "mide {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout utf8")
}

pub fn session_file(home: &Path) -> PathBuf {
    config_dir(home).join("session.json")
}

pub fn read_session(home: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(session_file(home)).expect("read session");
    serde_json::from_str(&raw).expect("parse session")
}
