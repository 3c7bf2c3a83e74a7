//! Integration tests for the `inspector` binary entry point.
//!
//! Exercises configuration layering through real flags and environment
//! variables, and the exit status contract for protocol failures.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use predicates::str::contains;

#[test]
fn catalog_lists_builtin_commands() {
    let mut command = cargo_bin_cmd!("inspector");
    command.args(["catalog", "--domain", "Inspector"]);
    command
        .assert()
        .success()
        .stdout(contains("Inspector.reloadPage(ignoreCache: boolean)\n"));
}

#[test]
fn encode_prints_the_outbound_message() {
    let mut command = cargo_bin_cmd!("inspector");
    command.args(["encode", "Network.enable"]);
    command.assert().success().stdout(
        "{\"domain\":\"Network\",\"command\":\"enable\",\"id\":1,\"arguments\":{}}\n",
    );
}

#[test]
fn type_mismatch_exits_with_one() {
    let mut command = cargo_bin_cmd!("inspector");
    command.args(["encode", "Inspector.reloadPage", "\"yes\""]);
    command
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(contains("it should be 'boolean' but it is 'string'"));
}

#[test]
fn external_catalog_replaces_builtin() {
    let directory = tempfile::tempdir().expect("tempdir");
    let path = directory.path().join("catalog.json");
    std::fs::write(
        &path,
        r#"{"version":"test","commands":[{"domain":"Echo","command":"say","arguments":[{"name":"text","type":"string"}]}]}"#,
    )
    .expect("write catalog");

    let mut command = cargo_bin_cmd!("inspector");
    command.arg("--catalog-path").arg(&path).arg("catalog");
    command
        .assert()
        .success()
        .stdout("Echo.say(text: string)\n");
}

#[test]
fn invalid_log_filter_is_an_infrastructure_failure() {
    let mut command = cargo_bin_cmd!("inspector");
    command
        .env("INSPECTOR_LOG_FILTER", "inspector=loud")
        .arg("catalog");
    command
        .assert()
        .code(2)
        .stderr(contains("invalid log filter"));
}

#[cfg(unix)]
#[test]
fn call_reports_backend_errors_with_status_one() {
    let script = concat!(
        "head -c 83 >/dev/null; ",
        "printf 'Content-Length: 44\\r\\n\\r\\n{\"requestId\":1,\"error\":{\"message\":\"denied\"}}'"
    );
    let mut command = cargo_bin_cmd!("inspector");
    command.args([
        "--response-timeout-secs",
        "10",
        "call",
        "--backend",
        "sh",
        "--arg",
        "-c",
        "--arg",
        script,
        "Network.enable",
    ]);
    command
        .assert()
        .code(1)
        .stderr(contains("backend replied with an error"))
        .stderr(contains("denied"));
}

#[cfg(unix)]
#[test]
fn backend_that_exits_silently_is_an_infrastructure_failure() {
    let mut command = cargo_bin_cmd!("inspector");
    command.args(["call", "--backend", "true", "Network.enable"]);
    command
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[cfg(unix)]
#[test]
fn dump_switch_logs_both_directions_at_the_default_filter() {
    let script = concat!(
        "head -c 83 >/dev/null; ",
        "printf 'Content-Length: 25\\r\\n\\r\\n{\"requestId\":1,\"body\":{}}'"
    );
    let mut command = cargo_bin_cmd!("inspector");
    command.env_remove("INSPECTOR_LOG_FILTER").args([
        "call",
        "--backend",
        "sh",
        "--arg",
        "-c",
        "--arg",
        script,
        "--dump-protocol-messages",
        "Network.enable",
    ]);
    command
        .assert()
        .success()
        .stdout("{}\n")
        .stderr(contains(
            r#"frontend: {"domain":"Network","command":"enable","id":1,"arguments":{}}"#,
        ))
        .stderr(contains(r#"backend: {"requestId":1,"body":{}}"#));
}
