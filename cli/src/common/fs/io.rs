//! # DockStation Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! This module centralizes the filesystem operations DockStation performs on
//! its two cached artifacts, the downloaded docker-machine executable and the
//! TLS credential bundle. Both must never be observed half-written, so writes
//! go through a temporary file in the destination directory that is renamed
//! over the target once complete.
//!
//! ## Architecture
//!
//! - **`ensure_dir_exists`**: Creates a directory (and parents) if missing; errors if the path is a file.
//! - **`read_file`**: `fs::read` with context naming the file.
//! - **`write_atomically`**: Writes bytes to a `tempfile::NamedTempFile` beside the target and persists it over the target. On failure the temporary file is deleted and the target is untouched.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dockstation::common::fs::io;
//! use std::path::Path;
//!
//! # fn run_example() -> anyhow::Result<()> {
//! io::write_atomically(Path::new("./certs/key.bundle.pem"), b"...")?;
//! let bytes = io::read_file(Path::new("./certs/key.bundle.pem"))?;
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::{DockStationError, Result};
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Ensures that a directory exists at the specified path.
///
/// If the path does not exist, this function creates the directory, including
/// any necessary parent directories (similar to `mkdir -p`).
///
/// # Errors
///
/// Returns an `Err` if:
/// - The path exists but is not a directory (`DockStationError::FileSystem`).
/// - Creating the directory fails (e.g., due to permissions).
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(DockStationError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Writes `content` to `path`, replacing any existing file in one step.
///
/// The bytes are first written to a temporary file created in the same
/// directory as `path` (so the final rename never crosses filesystems), then
/// flushed and renamed over the target. If any step fails the temporary file
/// is removed when it goes out of scope and the original target is left as it
/// was.
///
/// # Errors
///
/// Returns an `Err` if the parent directory cannot be created, or if writing
/// or renaming the temporary file fails.
pub fn write_atomically(path: &Path, content: &[u8]) -> Result<()> {
    // Resolve the directory the temporary file must live in.
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir_exists(parent)?;

    let mut temp = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
    temp.write_all(content)
        .with_context(|| format!("Failed to write temporary file for {:?}", path))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to flush temporary file for {:?}", path))?;

    // `persist` renames over an existing target on every platform.
    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move temporary file into place at {:?}", path))?;
    info!("Wrote {} bytes to {:?}", content.len(), path);
    Ok(())
}
