//! # DockStation Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem helpers shared by the tool locator and the credential bundler.
//! See [`io`] for the write-temp-then-rename persistence both rely on.
//!

/// Basic file I/O operations (`ensure_dir_exists`, `read_file`, `write_atomically`).
pub mod io;
