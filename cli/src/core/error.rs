//! # DockStation Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error taxonomy used throughout DockStation. Every
//! failure a caller may want to react to has a dedicated `DockStationError`
//! variant carrying enough context (exit code and captured output, the
//! underlying transport error, the missing key) to diagnose the problem
//! without re-running with extra logging.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `DockStationError`: A custom error enum using `thiserror` for specific error types
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! The error types cover:
//! - Platform and tool acquisition errors (`UnsupportedPlatform`, `ToolUnavailable`)
//! - Machine provisioning errors (`MachineToolExecutionFailure`, `MachineStateUnknown`, `MalformedEnvironment`)
//! - Credential conversion errors (`CredentialBuildFailure`)
//! - Docker interaction errors (`DockerApi`, `DockerOperation`, `ContainerStartFailure`)
//! - Configuration and argument errors
//!
//! ## Examples
//!
//! Classifying a failure returned by the library:
//!
//! ```rust
//! use dockstation::core::error::DockStationError;
//!
//! # fn classify(result: anyhow::Result<()>) {
//! match result {
//!     Ok(()) => println!("Resolved"),
//!     Err(e) if e.downcast_ref::<DockStationError>().is_some_and(|de| {
//!         matches!(de, DockStationError::UnsupportedPlatform { .. })
//!     }) => {
//!         println!("docker-machine has no release for this host");
//!     }
//!     Err(e) => eprintln!("Error: {:#}", e),
//! }
//! # }
//! ```
//!
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for the DockStation library and CLI.
#[derive(Error, Debug)]
pub enum DockStationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("docker-machine is not available for {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Could not download docker-machine from '{url}'")]
    ToolUnavailable {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("docker-machine {command} failed with exit code {exit_code}. Output:\n{output}")]
    MachineToolExecutionFailure {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error(
        "Machine '{name}' (driver '{driver}') reports an unknown state. \
         Drivers such as hyperv need administrator privileges to report machine state."
    )]
    MachineStateUnknown { name: String, driver: String },

    #[error("docker-machine env output is missing required key '{key}'")]
    MalformedEnvironment { key: String },

    #[error("Could not build TLS credentials from '{}'", cert_dir.display())]
    CredentialBuildFailure {
        cert_dir: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Docker API interaction failed: {source}")]
    DockerApi {
        #[from]
        source: bollard::errors::Error,
    },

    #[error("Docker operation failed: {0}")]
    DockerOperation(String),

    #[error(
        "Container '{name}' could not be started. \
         Check the image documentation for missing arguments or environment variables."
    )]
    ContainerStartFailure {
        name: String,
        #[source]
        source: bollard::errors::Error,
    },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
/// Anyhow allows for easy context addition and flexible error handling.
pub type Result<T> = anyhow::Result<T>;
