//! Tests for running a sync through a command runner.

use crate::error::RsyncError;
use crate::rsync::{Rsync, RsyncConfig};
use crate::test_support::ScriptedRunner;
use rstest::rstest;

use super::fixtures::{base_config, remote_config};

#[rstest]
fn sync_with_passes_unquoted_argv(remote_config: RsyncConfig) {
    let config = RsyncConfig {
        exclude: vec![String::from("a b")],
        ..remote_config
    };
    let rsync = Rsync::new(config).expect("config should validate");
    let runner = ScriptedRunner::new();
    runner.push_success();

    rsync
        .sync_with(".", "/home/test/", &runner)
        .expect("zero status should succeed");

    let invocations = runner.invocations();
    let [invocation] = invocations.as_slice() else {
        panic!("expected exactly one invocation, got {invocations:?}");
    };
    assert_eq!(invocation.program, "/usr/bin/rsync");
    assert_eq!(
        invocation.arg_strings(),
        [
            "-La",
            "--exclude",
            "a b",
            "--rsh",
            "ssh -p 2342",
            ".",
            "test@test.com:/home/test/",
        ]
    );
}

#[rstest]
fn sync_with_returns_error_on_non_zero_status(base_config: RsyncConfig) {
    let rsync = Rsync::new(base_config).expect("config should validate");
    let runner = ScriptedRunner::new();
    runner.push_failure(12);

    let err = rsync
        .sync_with("/origin", "/target", &runner)
        .expect_err("non-zero rsync should error");

    let RsyncError::CommandFailure {
        status,
        status_text,
        ..
    } = err
    else {
        panic!("expected CommandFailure");
    };
    assert_eq!(status, Some(12));
    assert_eq!(status_text, "12");
}

#[rstest]
fn sync_with_surfaces_missing_login_before_running(base_config: RsyncConfig) {
    let config = RsyncConfig {
        ssh: Some(crate::ssh::SshOptions::default()),
        ..base_config
    };
    let rsync = Rsync::new(config).expect("login is checked lazily");
    let runner = ScriptedRunner::new();

    let err = rsync
        .sync_with("/origin", "/target", &runner)
        .expect_err("missing username should fail");

    assert!(matches!(err, RsyncError::Validation { .. }), "unexpected error: {err:?}");
    assert!(runner.invocations().is_empty(), "nothing should be spawned");
}

#[rstest]
fn sync_reports_spawn_failure_for_missing_executable(base_config: RsyncConfig) {
    let config = RsyncConfig {
        executable: String::from("/nonexistent/bin/rsync"),
        show_output: false,
        ..base_config
    };
    let rsync = Rsync::new(config).expect("config should validate");

    let err = rsync
        .sync("/origin", "/target")
        .expect_err("missing binary should fail to spawn");

    assert!(
        matches!(err, RsyncError::Spawn { ref program, .. } if program == "/nonexistent/bin/rsync"),
        "unexpected error: {err:?}"
    );
}

#[cfg(unix)]
#[rstest]
#[case::captured(false)]
#[case::streamed(true)]
fn sync_runs_configured_executable(base_config: RsyncConfig, #[case] show_output: bool) {
    let mut config = RsyncConfig {
        times: true,
        show_output,
        ..base_config
    };
    config
        .set_executable("/bin/echo")
        .expect("echo should be executable");
    let rsync = Rsync::new(config).expect("config should validate");

    let output = rsync
        .sync("/origin", "/target")
        .expect("echo should succeed");

    assert_eq!(output.stdout, "-La --times /origin /target\n");
}
