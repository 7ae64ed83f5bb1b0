//! # DockStation CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test file
//! that needs them declares `mod common;`.
//!

#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::Path;

const DOCKER_VARS: [&str; 5] = [
    "DOCKER_HOST",
    "DOCKER_TLS_VERIFY",
    "DOCKER_CERT_PATH",
    "DOCKER_MACHINE_DRIVER",
    "HYPERV_SWITCH_NAME",
];

/// The compiled `dockstation` binary.
pub fn dockstation_cmd() -> Command {
    Command::cargo_bin("dockstation").expect("Failed to find dockstation binary for testing")
}

/// `dockstation` running in `workdir` with no inherited Docker variables and
/// no user configuration file.
pub fn isolated_cmd(workdir: &Path) -> Command {
    let mut cmd = dockstation_cmd();
    cmd.current_dir(workdir)
        .env("HOME", workdir)
        .env("XDG_CONFIG_HOME", workdir.join(".config"))
        .env_remove("RUST_LOG");
    for var in DOCKER_VARS {
        cmd.env_remove(var);
    }
    cmd
}
