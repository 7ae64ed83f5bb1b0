//! # DockStation Docker Module Interface
//!
//! File: cli/src/common/docker/mod.rs
//!
//! ## Overview
//!
//! Everything DockStation does against a container engine once an endpoint is
//! known. Engine access goes through the `EngineClient` trait, implemented for
//! `bollard::Docker`, so the flows here can be unit tested without a daemon.
//!
//! ## Architecture
//!
//! - **`engine`**: The `EngineClient` trait and its `bollard` implementation.
//! - **`connect`**: Builds a `bollard::Docker` for a resolved `Endpoint`.
//! - **`images`**: Pull-if-missing with `:latest` normalization.
//! - **`state`**: Exact-name container lookup and published port read-back.
//! - **`lifecycle`**: Stop/remove with tolerance for "already done" responses.
//! - **`operations`**: `ContainerFactory` and the scoped `ContainerHandle`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dockstation::common::docker::{connect_endpoint, ContainerFactory};
//! use dockstation::common::host::Endpoint;
//! use std::sync::Arc;
//!
//! # async fn run_example() -> anyhow::Result<()> {
//! let endpoint = Endpoint::native("/var/run/docker.sock");
//! let docker = connect_endpoint(&endpoint, 120)?;
//! let factory = ContainerFactory::new(Arc::new(docker), endpoint.service_host());
//! factory.remove_container("httpEcho").await?;
//! # Ok(())
//! # }
//! ```
//!

/// Builds engine clients for resolved endpoints.
pub mod connect;
/// The engine API seam (`EngineClient`).
pub mod engine;
/// Image presence checks and pulls.
pub mod images;
/// Stop and remove with "already done" tolerance.
pub mod lifecycle;
/// Container creation and scoped disposal.
pub mod operations;
/// Read-only container queries.
pub mod state;

// --- Re-exports for easier access from other parts of the application ---
pub use connect::connect_endpoint;
pub use engine::EngineClient;
pub use operations::{ContainerFactory, ContainerHandle};
