//! # DockStation Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! The building blocks shared by the library API and the `dockstation`
//! binary. Command handlers (`commands::`) stay thin and call into these
//! modules; `core::` holds configuration and the error type.
//!
//! ## Architecture
//!
//! - **`docker`**: Engine client seam, connection, image and container lifecycle.
//! - **`host`**: Endpoint resolution and the per-process engine fixture.
//! - **`machine`**: Locating and driving the docker-machine tool.
//! - **`tls`**: Building the client identity bundle from machine certificates.
//! - **`fs`**: Directory creation, file reads and atomic writes.
//! - **`network`**: Downloading files over HTTP(S).
//! - **`process`**: Running external commands and capturing their output.
//! - **`system`**: Host OS/architecture detection and `PATH` lookups.
//!

/// Container engine interaction (connect, images, containers).
pub mod docker;
/// Filesystem helpers.
pub mod fs;
/// Engine endpoint resolution.
pub mod host;
/// docker-machine location and invocation.
pub mod machine;
/// HTTP downloads.
pub mod network;
/// External process execution.
pub mod process;
/// Host platform inspection.
pub mod system;
/// Client credential bundling for mutual TLS.
pub mod tls;
