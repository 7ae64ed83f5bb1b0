//! # DockStation
//!
//! File: cli/src/lib.rs
//!
//! ## Overview
//!
//! DockStation gives integration test suites a working container engine and
//! throwaway containers on it:
//!
//! - `common::host::EndpointResolver` finds an engine: an explicit
//!   `DOCKER_HOST`, the native socket or pipe, or a docker-machine VM it
//!   provisions on demand (downloading the tool and converting the machine's
//!   TLS certificates when needed).
//! - `common::docker::ContainerFactory` creates named containers with
//!   published ports and returns handles that tear them down again.
//! - `common::host::HostFixture` does both once per test process.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dockstation::common::host::HostFixture;
//!
//! # async fn run_example() -> anyhow::Result<()> {
//! let factory = HostFixture::shared()?.factory().await?;
//! let redis = factory.create_container("cache", &[6379], "redis:7", &[]).await?;
//! println!("redis at {}:{}", redis.host(), redis.exposed_ports()[0]);
//! redis.dispose().await;
//! # Ok(())
//! # }
//! ```
//!

pub mod common;
pub mod core;
