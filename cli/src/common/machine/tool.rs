//! # docker-machine Command Wrapper
//!
//! File: cli/src/common/machine/tool.rs
//!
//! ## Overview
//!
//! `MachineTool` turns the docker-machine subcommands DockStation needs into
//! typed async calls. Each call runs the executable once, waits for it to exit
//! and either returns parsed output or fails with
//! `DockStationError::MachineToolExecutionFailure` carrying the exit code and
//! everything the tool printed. Failures are never retried.
//!
//! | Call      | Command line                                                      |
//! |-----------|-------------------------------------------------------------------|
//! | `list`    | `ls --format "{{.Name}};{{.DriverName}};{{.State}};{{.URL}}"`     |
//! | `create`  | `create --driver <d> [--hyperv-virtual-switch <s>] <name>`        |
//! | `start`   | `start <name>`                                                    |
//! | `env`     | `env <name>`                                                      |
//!
use super::env::MachineEnvironment;
use super::list::{parse_listing, MachineDescriptor, LIST_FORMAT};
use crate::common::process::CommandRunner;
use crate::core::error::{DockStationError, Result};
use anyhow::anyhow;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument};

/// Driver that needs a virtual switch argument.
pub const HYPERV_DRIVER: &str = "hyperv";

/// Async wrapper over one docker-machine executable.
pub struct MachineTool {
    program: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl MachineTool {
    pub fn new(program: PathBuf, runner: Arc<dyn CommandRunner>) -> Self {
        Self { program, runner }
    }

    /// Lists all machines known to the tool.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<MachineDescriptor>> {
        let output = self.invoke(&["ls", "--format", LIST_FORMAT]).await?;
        Ok(parse_listing(&output))
    }

    /// Creates and boots a machine. `hyperv_switch` is only passed to the hyperv driver.
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str, driver: &str, hyperv_switch: &str) -> Result<()> {
        info!("Creating machine '{}' with driver '{}'", name, driver);
        let mut args = vec!["create", "--driver", driver];
        if driver.eq_ignore_ascii_case(HYPERV_DRIVER) {
            args.extend(["--hyperv-virtual-switch", hyperv_switch]);
        }
        args.push(name);
        self.invoke(&args).await.map(|_| ())
    }

    #[instrument(skip(self))]
    pub async fn start(&self, name: &str) -> Result<()> {
        info!("Starting machine '{}'", name);
        self.invoke(&["start", name]).await.map(|_| ())
    }

    /// Reads the connection settings of a machine.
    #[instrument(skip(self))]
    pub async fn env(&self, name: &str) -> Result<MachineEnvironment> {
        let output = self.invoke(&["env", name]).await?;
        MachineEnvironment::parse(&output)
    }

    async fn invoke(&self, args: &[&str]) -> Result<String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let output = self.runner.run(&self.program, &args).await?;
        if !output.success() {
            return Err(anyhow!(DockStationError::MachineToolExecutionFailure {
                command: args.join(" "),
                exit_code: output.exit_code,
                output: output.combined(),
            }));
        }
        Ok(output.stdout)
    }
}
