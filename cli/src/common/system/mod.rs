//! # DockStation System Utilities Module (`common::system`)
//!
//! File: cli/src/common/system/mod.rs
//!
//! ## Overview
//!
//! This module gathers the facts DockStation needs about the host it runs on:
//! the operating system and CPU architecture (to pick a docker-machine
//! release), whether a tool is installed on `PATH`, and whether a native engine
//! socket or named pipe exists.
//!
//! ## Architecture
//!
//! - **`HostOs` / `HostArch`**: Typed views over `std::env::consts::{OS, ARCH}`.
//! - **`HostEnvironment`**: The trait the locator and resolver query. Tests
//!   substitute fixed answers; `SystemHost` answers for the real machine using
//!   `which` for PATH lookups.
//!
use std::path::Path;
use tracing::debug;

/// Operating system families DockStation distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    Linux,
    MacOs,
    Other(&'static str),
}

impl HostOs {
    /// The operating system this binary was compiled for.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => HostOs::Windows,
            "linux" => HostOs::Linux,
            "macos" => HostOs::MacOs,
            other => HostOs::Other(other),
        }
    }

    /// Suffix appended to executable file names.
    pub fn executable_suffix(self) -> &'static str {
        match self {
            HostOs::Windows => ".exe",
            _ => "",
        }
    }
}

/// CPU architectures DockStation distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostArch {
    X86_64,
    X86,
    Arm,
    Aarch64,
    Other(&'static str),
}

impl HostArch {
    /// The architecture this binary was compiled for.
    pub fn current() -> Self {
        match std::env::consts::ARCH {
            "x86_64" => HostArch::X86_64,
            "x86" => HostArch::X86,
            "arm" => HostArch::Arm,
            "aarch64" => HostArch::Aarch64,
            other => HostArch::Other(other),
        }
    }
}

/// Host facts consulted during endpoint resolution.
pub trait HostEnvironment: Send + Sync {
    fn os(&self) -> HostOs;
    fn arch(&self) -> HostArch;
    /// True when `name` resolves to an executable on `PATH`.
    fn tool_in_path(&self, name: &str) -> bool;
    /// True when a file, socket or named pipe exists at `path`.
    fn path_exists(&self, path: &Path) -> bool;
}

/// `HostEnvironment` backed by the running machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl HostEnvironment for SystemHost {
    fn os(&self) -> HostOs {
        HostOs::current()
    }

    fn arch(&self) -> HostArch {
        HostArch::current()
    }

    fn tool_in_path(&self, name: &str) -> bool {
        match which::which(name) {
            Ok(found) => {
                debug!("Found '{}' on PATH at {}", name, found.display());
                true
            }
            Err(_) => false,
        }
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_suffix() {
        assert_eq!(HostOs::Windows.executable_suffix(), ".exe");
        assert_eq!(HostOs::Linux.executable_suffix(), "");
        assert_eq!(HostOs::MacOs.executable_suffix(), "");
    }

    #[test]
    fn test_current_matches_compile_target() {
        if cfg!(target_os = "linux") {
            assert_eq!(HostOs::current(), HostOs::Linux);
        }
        if cfg!(target_arch = "x86_64") {
            assert_eq!(HostArch::current(), HostArch::X86_64);
        }
    }

    #[test]
    fn test_system_host_path_exists() {
        let dir = tempfile::tempdir().unwrap();
        let host = SystemHost;
        assert!(host.path_exists(dir.path()));
        assert!(!host.path_exists(&dir.path().join("docker.sock")));
    }
}
