//! # DockStation Command Handlers
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per `dockstation` subcommand. Handlers parse nothing themselves
//! (clap does that in `main.rs`) and delegate to the library in
//! `dockstation::common`.
//!
//! - **`endpoint`**: `dockstation endpoint`
//! - **`container`**: `dockstation run` and `dockstation rm`
//!

pub mod container;
pub mod endpoint;
