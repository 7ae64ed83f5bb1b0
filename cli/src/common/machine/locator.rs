//! # docker-machine Executable Locator
//!
//! File: cli/src/common/machine/locator.rs
//!
//! ## Overview
//!
//! Finds a runnable docker-machine executable, downloading the pinned release
//! when the host has none. Resolution order:
//!
//! 1. `docker-machine` on `PATH` (returned as the bare name).
//! 2. `<tool_dir>/docker-machine[.exe]` from a previous download.
//! 3. A fresh download of `docker-machine-<OS>-<ARCH>[.exe]` into `tool_dir`.
//!
//! The release asset is chosen before any network traffic, so a host whose OS
//! or architecture has no release token fails with `UnsupportedPlatform`
//! without touching the network. A mapped pair the release does not publish
//! fails at download time with `ToolUnavailable`.
//!
use crate::common::fs::io::ensure_dir_exists;
use crate::common::network::Downloader;
use crate::common::system::{HostArch, HostEnvironment, HostOs};
use crate::core::config::MachineConfig;
use crate::core::error::{DockStationError, Result};
use anyhow::{anyhow, Context};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Name of the tool on `PATH` and stem of the cached executable.
pub const TOOL_NAME: &str = "docker-machine";

fn os_token(os: HostOs) -> Option<&'static str> {
    match os {
        HostOs::Windows => Some("Windows"),
        HostOs::Linux => Some("Linux"),
        HostOs::MacOs => Some("Darwin"),
        HostOs::Other(_) => None,
    }
}

fn arch_token(arch: HostArch) -> Option<&'static str> {
    match arch {
        HostArch::X86_64 => Some("x86_64"),
        HostArch::X86 => Some("i386"),
        HostArch::Arm => Some("armhf"),
        HostArch::Aarch64 => Some("aarch64"),
        HostArch::Other(_) => None,
    }
}

fn os_label(os: HostOs) -> String {
    match os {
        HostOs::Other(name) => name.to_string(),
        known => os_token(known).unwrap_or_default().to_string(),
    }
}

fn arch_label(arch: HostArch) -> String {
    match arch {
        HostArch::Other(name) => name.to_string(),
        known => arch_token(known).unwrap_or_default().to_string(),
    }
}

/// Builds the release download URL for a host.
///
/// # Errors
///
/// `DockStationError::UnsupportedPlatform` when the OS or architecture has no
/// release token. A mapped pair always yields a URL; whether the release
/// actually carries that asset is only known once the download is attempted.
pub fn download_url(base: &str, version: &str, os: HostOs, arch: HostArch) -> Result<String> {
    let unsupported = || {
        anyhow!(DockStationError::UnsupportedPlatform {
            os: os_label(os),
            arch: arch_label(arch),
        })
    };
    let os_tok = os_token(os).ok_or_else(unsupported)?;
    let arch_tok = arch_token(arch).ok_or_else(unsupported)?;
    Ok(format!(
        "{}/v{}/{}-{}-{}{}",
        base.trim_end_matches('/'),
        version.trim_start_matches('v'),
        TOOL_NAME,
        os_tok,
        arch_tok,
        os.executable_suffix()
    ))
}

/// Locates (or fetches) the docker-machine executable.
pub struct CommandLocator {
    host: Arc<dyn HostEnvironment>,
    downloader: Arc<dyn Downloader>,
    tool_dir: PathBuf,
    version: String,
    download_base: String,
}

impl CommandLocator {
    pub fn new(
        host: Arc<dyn HostEnvironment>,
        downloader: Arc<dyn Downloader>,
        tool_dir: PathBuf,
        version: impl Into<String>,
        download_base: impl Into<String>,
    ) -> Self {
        Self {
            host,
            downloader,
            tool_dir,
            version: version.into(),
            download_base: download_base.into(),
        }
    }

    /// Builds a locator from `[machine]` settings. `tool_dir` falls back to the
    /// working directory.
    pub fn from_config(
        config: &MachineConfig,
        host: Arc<dyn HostEnvironment>,
        downloader: Arc<dyn Downloader>,
    ) -> Result<Self> {
        let tool_dir = match &config.tool_dir {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        Ok(Self::new(
            host,
            downloader,
            tool_dir,
            config.tool_version.clone(),
            config.download_base.clone(),
        ))
    }

    /// Path the downloaded executable is cached at.
    pub fn local_path(&self) -> PathBuf {
        self.tool_dir.join(format!(
            "{}{}",
            TOOL_NAME,
            self.host.os().executable_suffix()
        ))
    }

    /// Returns a path that can be handed to a process spawner.
    ///
    /// # Errors
    ///
    /// - `UnsupportedPlatform` if a download is needed but the OS or architecture has no release token.
    /// - `ToolUnavailable` if the download fails.
    #[instrument(skip(self), fields(tool_dir = %self.tool_dir.display()))]
    pub async fn locate(&self) -> Result<PathBuf> {
        if self.host.tool_in_path(TOOL_NAME) {
            debug!("Using {} from PATH", TOOL_NAME);
            return Ok(PathBuf::from(TOOL_NAME));
        }

        let local = absolutize(&self.local_path())?;
        if self.host.path_exists(&local) {
            debug!("Using cached executable at {}", local.display());
            return Ok(local);
        }

        let url = download_url(
            &self.download_base,
            &self.version,
            self.host.os(),
            self.host.arch(),
        )?;
        info!("{} not found, fetching {}", TOOL_NAME, url);
        ensure_dir_exists(&self.tool_dir)?;
        self.downloader
            .download(&url, &local)
            .await
            .map_err(|source| {
                anyhow!(DockStationError::ToolUnavailable {
                    url: url.clone(),
                    source,
                })
            })?;
        mark_executable(&local)?;
        Ok(local)
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("Failed to get current directory")?
            .join(path))
    }
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to mark {:?} as executable", path))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<()> {
    Ok(())
}
