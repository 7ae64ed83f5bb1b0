//! # DockStation docker-machine Integration (`common::machine`)
//!
//! File: cli/src/common/machine/mod.rs
//!
//! ## Overview
//!
//! When no engine is reachable locally, DockStation provisions a virtual
//! machine running one through the external docker-machine tool. This module
//! holds everything needed to drive that tool.
//!
//! ## Architecture
//!
//! - **`locator`**: Finds the executable on `PATH` or in the tool directory, downloading the pinned release if needed (`CommandLocator`).
//! - **`tool`**: Typed `ls`/`create`/`start`/`env` calls over a `CommandRunner` (`MachineTool`).
//! - **`list`**: Parser for `ls --format` rows (`MachineDescriptor`, `MachineState`).
//! - **`env`**: Parser for `env` output in any shell dialect (`parse`, `MachineEnvironment`).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dockstation::common::machine::{CommandLocator, MachineTool};
//! use dockstation::common::network::HttpDownloader;
//! use dockstation::common::process::TokioCommandRunner;
//! use dockstation::common::system::SystemHost;
//! use dockstation::core::config::MachineConfig;
//! use std::sync::Arc;
//!
//! # async fn run_example() -> anyhow::Result<()> {
//! let locator = CommandLocator::from_config(
//!     &MachineConfig::default(),
//!     Arc::new(SystemHost),
//!     Arc::new(HttpDownloader::new()),
//! )?;
//! let tool = MachineTool::new(locator.locate().await?, Arc::new(TokioCommandRunner));
//! for machine in tool.list().await? {
//!     println!("{} ({:?})", machine.name, machine.state);
//! }
//! # Ok(())
//! # }
//! ```
//!

pub mod env;
pub mod list;
pub mod locator;
pub mod tool;

pub use env::MachineEnvironment;
pub use list::{MachineDescriptor, MachineState};
pub use locator::CommandLocator;
pub use tool::MachineTool;
