//! Behavioural tests for running a sync through the CLI.
#![cfg(unix)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;

#[test]
fn cli_sync_streams_child_output() {
    let mut cmd = cargo_bin_cmd!("rsyncer");
    cmd.env_remove("RSYNCER_OPTIONS_FILE")
        .env("RSYNCER_EXECUTABLE", "/bin/echo")
        .args(["/origin", "/target"]);

    cmd.assert()
        .success()
        .stdout("-La /origin /target\n");
}

#[test]
fn cli_sync_quiet_captures_child_output() {
    let mut cmd = cargo_bin_cmd!("rsyncer");
    cmd.env_remove("RSYNCER_OPTIONS_FILE")
        .env("RSYNCER_EXECUTABLE", "/bin/echo")
        .args(["--quiet", "/origin", "/target"]);

    cmd.assert().success().stdout("");
}

#[test]
fn cli_sync_propagates_child_failure() {
    let mut cmd = cargo_bin_cmd!("rsyncer");
    cmd.env_remove("RSYNCER_OPTIONS_FILE")
        .env("RSYNCER_EXECUTABLE", "/bin/false")
        .args(["/origin", "/target"]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("exited with status 1"));
}

#[test]
fn cli_verbose_logs_rendered_command() {
    let mut cmd = cargo_bin_cmd!("rsyncer");
    cmd.env_remove("RSYNCER_OPTIONS_FILE")
        .env("RSYNCER_EXECUTABLE", "/bin/true")
        .args(["--verbose", "--quiet", "/origin", "/target"]);

    cmd.assert()
        .success()
        .stderr(contains("/bin/true -La /origin /target"));
}
