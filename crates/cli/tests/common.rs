use assert_cmd::Command;
use test_common::TestWorkspace;

/// Nothing listens here, so reachability checks fail fast
pub const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:9";

// Helper function to get a command instance isolated inside `workspace`
#[must_use]
pub fn get_command_in(workspace: &TestWorkspace, base_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("portal-cli").unwrap();

    cmd.current_dir(workspace.path())
        .env("PORTAL_CONFIG_DIR", workspace.path())
        .env("XDG_CONFIG_HOME", workspace.path().join(".config"))
        .env("HOME", workspace.path())
        .env("PORTAL_API_BASE_URL", base_url)
        .env("NO_PROXY", "127.0.0.1,localhost")
        .env_remove("PORTAL_ID")
        .env_remove("RUST_LOG")
        .arg("--no-color");

    cmd
}

// Helper function to get a command instance
#[must_use]
pub fn get_command() -> Command {
    Command::cargo_bin("portal-cli").unwrap()
}
