pub mod common;

use common::{UNREACHABLE_BASE_URL, get_command_in};
use predicates::prelude::*;
use test_common::{TestWorkspace, single_portal_config_yaml};

#[test]
fn test_init_refuses_existing_config() {
    let workspace = TestWorkspace::with_config(&single_portal_config_yaml());
    let mut cmd = get_command_in(&workspace, UNREACHABLE_BASE_URL);
    cmd.args(["init", "--api"]);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(
        workspace.read_config().as_deref(),
        Some(single_portal_config_yaml().as_str())
    );
}

#[test]
fn test_init_api_key_without_terminal_writes_nothing() {
    let workspace = TestWorkspace::empty();
    let mut cmd = get_command_in(&workspace, UNREACHABLE_BASE_URL);
    cmd.args(["init", "--api"]).write_stdin("");

    cmd.assert().code(1);

    assert!(workspace.read_config().is_none());
}

#[test]
fn test_init_oauth_failure_removes_placeholder() {
    let workspace = TestWorkspace::empty();
    let mut cmd = get_command_in(&workspace, UNREACHABLE_BASE_URL);
    cmd.args(["init", "--oauth"]).write_stdin("");

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("OAuth setup failed"));

    assert!(!workspace.config_path().exists());
}
