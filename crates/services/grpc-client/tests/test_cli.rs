//! Integration tests for the `cloudevents-client` binary

use assert_cmd::Command;
use predicates::prelude::*;

fn client() -> Command {
    let mut cmd = Command::cargo_bin("cloudevents-client").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("CLOUDEVENTS_TARGET")
        .env_remove("CLOUDEVENTS_CONFIG");
    cmd
}

/// Test: an unreachable service is logged and the process still exits 0
#[test]
fn test_unreachable_target_exits_successfully() {
    let mut cmd = client();
    cmd.args(["--target", "127.0.0.1:1", "--shutdown-timeout-secs", "1"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Sending CloudEvent"))
        .stdout(predicate::str::contains("RPC failed"))
        .stdout(predicate::str::contains("Channel shut down"));
}

/// Test: JSON logging emits one object per line
#[test]
fn test_json_logs() {
    let mut cmd = client();
    cmd.args(["--target", "127.0.0.1:1", "--shutdown-timeout-secs", "1", "--json-logs"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"level\":\"WARN\""));
}

/// Test: a TLS target is a setup failure
#[test]
fn test_tls_target_fails() {
    let mut cmd = client();
    cmd.args(["--target", "https://greeter.example.com:443"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not supported"));
}

/// Test: quiet mode suppresses info and warn output
#[test]
fn test_quiet() {
    let mut cmd = client();
    cmd.args(["--target", "127.0.0.1:1", "--shutdown-timeout-secs", "1", "-q"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Sending CloudEvent").not());
}

/// Test: help lists the target flag
#[test]
fn test_help() {
    let mut cmd = client();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--target"));
}
