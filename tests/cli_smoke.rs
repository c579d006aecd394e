//! Behavioural smoke tests for the CLI entrypoint.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn cli_without_arguments_prints_help_and_fails() {
    let mut cmd = cargo_bin_cmd!("rsyncer");
    cmd.env_remove("RSYNCER_OPTIONS_FILE");

    cmd.assert().failure().stderr(contains("Usage"));
}

#[test]
fn cli_print_renders_default_command() {
    let mut cmd = cargo_bin_cmd!("rsyncer");
    cmd.env_remove("RSYNCER_OPTIONS_FILE")
        .env_remove("RSYNCER_EXECUTABLE")
        .args(["--print", "/origin", "/target"]);

    cmd.assert()
        .success()
        .stdout("/usr/bin/rsync -La /origin /target\n");
}

#[test]
fn cli_print_reads_options_file_from_environment() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("options.json");
    std::fs::write(
        &path,
        r#"{"exclude": ["a b"], "remote_origin": true,
            "ssh": {"username": "deploy", "host": "10.0.0.5", "port": "231", "public_key": "/dev/null"}}"#,
    )
    .expect("write options");

    let mut cmd = cargo_bin_cmd!("rsyncer");
    cmd.env("RSYNCER_OPTIONS_FILE", &path)
        .env_remove("RSYNCER_EXECUTABLE")
        .args(["--print", "/srv/app/", "./app"]);

    cmd.assert().success().stdout(concat!(
        "/usr/bin/rsync -La --exclude 'a b' --rsh 'ssh -p 231 -i '\\''/dev/null'\\''' ",
        "deploy@10.0.0.5:/srv/app/ ./app\n"
    ));
}

#[test]
fn cli_rejects_invalid_port() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("options.json");
    std::fs::write(&path, r#"{"ssh": {"username": "u", "host": "h", "port": "ssh"}}"#)
        .expect("write options");

    let mut cmd = cargo_bin_cmd!("rsyncer");
    cmd.arg("--options-file")
        .arg(&path)
        .args(["--print", "/origin", "/target"]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("invalid port"));
}

#[test]
fn cli_reports_missing_login_without_running() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("options.json");
    std::fs::write(&path, r#"{"ssh": {"host": "example.com"}}"#).expect("write options");

    let mut cmd = cargo_bin_cmd!("rsyncer");
    cmd.arg("--options-file")
        .arg(&path)
        .args(["/origin", "/target"]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("missing username"));
}
