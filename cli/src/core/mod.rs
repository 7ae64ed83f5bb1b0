//! # DockStation Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components shared by every
//! other part of DockStation: configuration loading and the error taxonomy.
//!
//! ## Architecture
//!
//! - `config`: Configuration loading, merging, environment overrides and validation
//! - `error`: Error types and the crate-wide `Result` alias
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{DockStationError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
