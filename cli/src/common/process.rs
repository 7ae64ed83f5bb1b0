//! # DockStation Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! This module runs external programs (docker-machine, in practice) to
//! completion and captures their output. The calling flow waits for the child
//! to exit; stdout and stderr are fully buffered, which suits the short
//! textual output of management tools but is not meant for streaming.
//!
//! ## Architecture
//!
//! - **`CommandRunner`**: Async trait with a single `run(program, args)` call,
//!   the seam the machine tool wrapper is tested through.
//! - **`TokioCommandRunner`**: Implementation on `tokio::process::Command` with
//!   stdin closed and both output streams captured.
//! - **`ProcessOutput`**: Exit code plus captured text.
//!
//! Interpreting a nonzero exit code is left to the caller, which knows which
//! subcommand failed.
//!
use crate::core::error::Result;
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tracing::{debug, instrument};

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or -1 when the process was terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout followed by stderr, for diagnostics.
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Runs a program to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput>;
}

/// `CommandRunner` spawning real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    #[instrument(skip(self, args), fields(program = %program.display()))]
    async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput> {
        debug!("Running {} {}", program.display(), args.join(" "));
        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to launch '{}'", program.display()))?;

        let result = ProcessOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!("{} exited with code {}", program.display(), result.exit_code);
        Ok(result)
    }
}
