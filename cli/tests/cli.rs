//! # DockStation CLI Integration Tests
//!
//! File: cli/tests/cli.rs
//!
//! ## Overview
//!
//! Top-level behavior of the `dockstation` binary: standard flags, argument
//! validation, and the commands that work without a running engine.
//!

mod common;
use common::*;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_help_lists_subcommands() {
    dockstation_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("endpoint"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("rm"));
}

#[test]
fn test_version_flag() {
    dockstation_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_run_requires_name_port_and_image() {
    dockstation_cmd()
        .args(["run", "--image", "nginx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--name"));
}

#[test]
fn test_endpoint_uses_docker_host() {
    let workdir = tempfile::tempdir().unwrap();
    isolated_cmd(workdir.path())
        .env("DOCKER_HOST", "tcp://127.0.0.1:9")
        .arg("endpoint")
        .assert()
        .success()
        .stdout(predicate::str::diff("tcp://127.0.0.1:9\n"));
}

#[test]
fn test_endpoint_env_output() {
    let workdir = tempfile::tempdir().unwrap();
    isolated_cmd(workdir.path())
        .env("DOCKER_HOST", "tcp://127.0.0.1:9")
        .args(["endpoint", "--env"])
        .assert()
        .success()
        .stdout(predicate::str::diff("DOCKER_HOST=tcp://127.0.0.1:9\n"));
}

#[test]
fn test_project_config_supplies_host() {
    let workdir = tempfile::tempdir().unwrap();
    fs::create_dir(workdir.path().join(".git")).unwrap();
    fs::write(
        workdir.path().join(".dockstation.toml"),
        "[engine]\nhost = \"tcp://10.0.0.5:2375\"\n",
    )
    .unwrap();

    isolated_cmd(workdir.path())
        .arg("endpoint")
        .assert()
        .success()
        .stdout(predicate::str::contains("tcp://10.0.0.5:2375"));
}

#[test]
fn test_invalid_host_is_reported() {
    let workdir = tempfile::tempdir().unwrap();
    isolated_cmd(workdir.path())
        .env("DOCKER_HOST", "ftp://engine")
        .args(["rm", "web"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("ftp://engine"));
}

#[test]
fn test_tls_without_cert_path_is_reported() {
    let workdir = tempfile::tempdir().unwrap();
    isolated_cmd(workdir.path())
        .env("DOCKER_HOST", "tcp://127.0.0.1:2376")
        .env("DOCKER_TLS_VERIFY", "1")
        .arg("endpoint")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("DOCKER_CERT_PATH"));
}
