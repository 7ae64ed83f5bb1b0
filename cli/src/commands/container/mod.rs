//! # DockStation Container Commands
//!
//! File: cli/src/commands/container/mod.rs
//!
//! ## Overview
//!
//! Handlers for the container-facing subcommands, `dockstation run` and
//! `dockstation rm`. Both resolve the engine through a `HostFixture` built
//! from the loaded configuration and act through its `ContainerFactory`.
//!

pub mod rm;
pub mod run;

use anyhow::Context;
use dockstation::common::host::HostFixture;
use dockstation::core::config;
use dockstation::core::error::Result;

/// Fixture for the current configuration. Resolution happens on first use.
pub(crate) fn fixture() -> Result<HostFixture> {
    let cfg = config::load_config().context("Failed to load DockStation configuration")?;
    Ok(HostFixture::new(cfg))
}
