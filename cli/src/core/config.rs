//! # DockStation Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module implements the configuration system for DockStation, handling
//! loading, merging, validation, and access to configuration data. It combines
//! defaults, user settings, project-specific overrides and the Docker
//! environment variables test runners commonly export.
//!
//! ## Architecture
//!
//! The configuration system follows these principles:
//! - Configuration is loaded from multiple sources in order of precedence
//! - Paths are expanded (e.g., `~` to home directory)
//! - Configuration is validated for correctness before use
//! - Structured data models ensure type safety
//!
//! Configuration sources (in order of precedence):
//! 1. Environment variables (`DOCKER_HOST`, `DOCKER_TLS_VERIFY`, `DOCKER_CERT_PATH`,
//!    `DOCKER_MACHINE_DRIVER`, `HYPERV_SWITCH_NAME`)
//! 2. Project-specific `.dockstation.toml` in current directory or ancestors
//! 3. User-specific `config.toml` in the platform config directory
//! 4. Default values defined in the code
//!
//! ## Examples
//!
//! ```rust,no_run
//! use dockstation::core::config;
//!
//! # fn run() -> anyhow::Result<()> {
//! let cfg = config::load_config()?;
//! println!("Machine name: {}", cfg.machine.name);
//! println!("Explicit engine host: {:?}", cfg.engine.host);
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::{DockStationError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Environment variable holding an explicit engine endpoint.
pub const DOCKER_HOST_VAR: &str = "DOCKER_HOST";
/// Environment variable enabling TLS for the explicit endpoint.
pub const DOCKER_TLS_VERIFY_VAR: &str = "DOCKER_TLS_VERIFY";
/// Environment variable pointing at the client certificate directory.
pub const DOCKER_CERT_PATH_VAR: &str = "DOCKER_CERT_PATH";
/// Environment variable overriding the docker-machine driver.
pub const MACHINE_DRIVER_VAR: &str = "DOCKER_MACHINE_DRIVER";
/// Environment variable overriding the Hyper-V virtual switch name.
pub const HYPERV_SWITCH_VAR: &str = "HYPERV_SWITCH_NAME";

const PROJECT_CONFIG_FILENAME: &str = ".dockstation.toml";

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)] // Error if unknown fields are in TOML
pub struct Config {
    #[serde(default)]
    pub machine: MachineConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub containers: ContainersConfig,
}

/// Settings for the docker-machine fallback.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MachineConfig {
    /// Name of the machine DockStation creates and reuses.
    #[serde(default = "default_machine_name")]
    pub name: String,
    /// Driver override. `None` picks `hyperv` on Windows, `virtualbox` elsewhere.
    #[serde(default)]
    pub driver: Option<String>,
    /// Virtual switch handed to the hyperv driver.
    #[serde(default = "default_hyperv_switch")]
    pub hyperv_switch: String,
    /// Pinned docker-machine release.
    #[serde(default = "default_tool_version")]
    pub tool_version: String,
    /// Base URL of the docker-machine release downloads.
    #[serde(default = "default_download_base")]
    pub download_base: String,
    /// Directory holding the downloaded executable. Defaults to the working directory.
    #[serde(default)]
    pub tool_dir: Option<String>,
}

/// Settings describing how to reach the container engine.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Explicit endpoint (`unix://`, `npipe://`, `tcp://`, `http://`, `https://`).
    #[serde(default)]
    pub host: Option<String>,
    /// Use mutual TLS with the explicit endpoint.
    #[serde(default)]
    pub tls_verify: bool,
    /// Directory holding `cert.pem`, `key.pem` and optionally `ca.pem` for the explicit endpoint.
    #[serde(default)]
    pub cert_path: Option<String>,
    /// CA file the engine certificate must chain to, instead of the `ca.pem` in the cert directory.
    #[serde(default)]
    pub ca_path: Option<String>,
    /// Native engine socket (or named pipe) probed before provisioning a machine.
    #[serde(default = "default_native_socket")]
    pub native_socket: String,
    /// Request timeout for engine API calls, in seconds.
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,
}

/// Settings for containers created through the lifecycle manager.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ContainersConfig {
    /// Grace period handed to the engine when stopping a container.
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_secs: i64,
    /// How long to wait for a replaced container's name to disappear.
    #[serde(default = "default_removal_wait")]
    pub removal_wait_ms: u64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            name: default_machine_name(),
            driver: None,
            hyperv_switch: default_hyperv_switch(),
            tool_version: default_tool_version(),
            download_base: default_download_base(),
            tool_dir: None,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: None,
            tls_verify: false,
            cert_path: None,
            ca_path: None,
            native_socket: default_native_socket(),
            timeout_secs: default_engine_timeout(),
        }
    }
}

impl Default for ContainersConfig {
    fn default() -> Self {
        Self {
            stop_timeout_secs: default_stop_timeout(),
            removal_wait_ms: default_removal_wait(),
        }
    }
}

fn default_machine_name() -> String {
    "DockStationVM".to_string()
}
fn default_hyperv_switch() -> String {
    "DockStationSwitch".to_string()
}
fn default_tool_version() -> String {
    "0.16.1".to_string()
}
fn default_download_base() -> String {
    "https://github.com/docker/machine/releases/download".to_string()
}
fn default_native_socket() -> String {
    if cfg!(windows) {
        r"\\.\pipe\docker_engine".to_string()
    } else {
        "/var/run/docker.sock".to_string()
    }
}
fn default_engine_timeout() -> u64 {
    120
}
fn default_stop_timeout() -> i64 {
    10
}
fn default_removal_wait() -> u64 {
    5000
}

/// Loads the effective configuration for this process.
///
/// Reads the user and project configuration files, merges them, applies the
/// Docker environment variables on top, expands `~` in paths and validates
/// the result.
///
/// # Errors
///
/// Returns an error if a configuration file cannot be read or parsed, or if
/// the merged configuration fails validation (`DockStationError::Config`).
pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    apply_env_overrides(&mut merged_config, |key| std::env::var(key).ok());
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "DockStation", "dockstation") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.dockstation.toml) found in current directory or ancestors.");
        Ok(None)
    }
}

/// Walks from `start` towards the filesystem root looking for `.dockstation.toml`.
/// The search stops at the first directory containing `.git`.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Overlays project settings on user settings. A project value wins whenever
/// it differs from the built-in default.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project = match project {
        Some(p) => p,
        None => return user,
    };
    let defaults = Config::default();

    fn pick<T: PartialEq>(project: T, user: T, default: &T) -> T {
        if project != *default {
            project
        } else {
            user
        }
    }

    Config {
        machine: MachineConfig {
            name: pick(project.machine.name, user.machine.name, &defaults.machine.name),
            driver: project.machine.driver.or(user.machine.driver),
            hyperv_switch: pick(
                project.machine.hyperv_switch,
                user.machine.hyperv_switch,
                &defaults.machine.hyperv_switch,
            ),
            tool_version: pick(
                project.machine.tool_version,
                user.machine.tool_version,
                &defaults.machine.tool_version,
            ),
            download_base: pick(
                project.machine.download_base,
                user.machine.download_base,
                &defaults.machine.download_base,
            ),
            tool_dir: project.machine.tool_dir.or(user.machine.tool_dir),
        },
        engine: EngineConfig {
            host: project.engine.host.or(user.engine.host),
            tls_verify: project.engine.tls_verify || user.engine.tls_verify,
            cert_path: project.engine.cert_path.or(user.engine.cert_path),
            ca_path: project.engine.ca_path.or(user.engine.ca_path),
            native_socket: pick(
                project.engine.native_socket,
                user.engine.native_socket,
                &defaults.engine.native_socket,
            ),
            timeout_secs: pick(
                project.engine.timeout_secs,
                user.engine.timeout_secs,
                &defaults.engine.timeout_secs,
            ),
        },
        containers: ContainersConfig {
            stop_timeout_secs: pick(
                project.containers.stop_timeout_secs,
                user.containers.stop_timeout_secs,
                &defaults.containers.stop_timeout_secs,
            ),
            removal_wait_ms: pick(
                project.containers.removal_wait_ms,
                user.containers.removal_wait_ms,
                &defaults.containers.removal_wait_ms,
            ),
        },
    }
}

/// Applies the Docker environment variables on top of file-based settings.
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = non_empty(DOCKER_HOST_VAR) {
        debug!("Using engine host from {}: {}", DOCKER_HOST_VAR, host);
        config.engine.host = Some(host);
    }
    if non_empty(DOCKER_TLS_VERIFY_VAR).is_some() {
        config.engine.tls_verify = true;
    }
    if let Some(cert_path) = non_empty(DOCKER_CERT_PATH_VAR) {
        config.engine.cert_path = Some(cert_path);
    }
    if let Some(driver) = non_empty(MACHINE_DRIVER_VAR) {
        info!("Using overridden docker-machine driver: {}", driver);
        config.machine.driver = Some(driver);
    }
    if let Some(switch) = non_empty(HYPERV_SWITCH_VAR) {
        info!("Using overridden Hyper-V switch name: {}", switch);
        config.machine.hyperv_switch = switch;
    }
}

fn expand_config_paths(config: &mut Config) {
    debug!("Expanding paths in configuration...");
    fn expand(path: &mut String) {
        *path = shellexpand::tilde(path.as_str()).into_owned();
    }
    for path in [
        &mut config.engine.cert_path,
        &mut config.engine.ca_path,
        &mut config.machine.tool_dir,
    ]
    .into_iter()
    .flatten()
    {
        expand(path);
    }
    expand(&mut config.engine.native_socket);
}

fn validate_config(config: &Config) -> Result<()> {
    info!("Validating final configuration...");
    if config.machine.name.trim().is_empty() {
        return Err(anyhow!(DockStationError::Config(
            "Machine name cannot be empty.".to_string()
        )));
    }
    if config.machine.tool_version.trim().is_empty() {
        return Err(anyhow!(DockStationError::Config(
            "docker-machine tool version cannot be empty.".to_string()
        )));
    }
    if config.engine.timeout_secs == 0 {
        return Err(anyhow!(DockStationError::Config(
            "Engine timeout must be greater than zero.".to_string()
        )));
    }
    if let Some(host) = &config.engine.host {
        const SCHEMES: [&str; 5] = ["unix://", "npipe://", "tcp://", "http://", "https://"];
        if !SCHEMES.iter().any(|s| host.starts_with(s)) {
            return Err(anyhow!(DockStationError::Config(format!(
                "Unsupported engine host '{}'. Expected one of: {}.",
                host,
                SCHEMES.join(", ")
            ))));
        }
        let wants_tls = config.engine.tls_verify || host.starts_with("https://");
        if wants_tls && config.engine.cert_path.is_none() {
            return Err(anyhow!(DockStationError::Config(format!(
                "TLS is enabled for '{}' but no certificate directory is set ({}).",
                host, DOCKER_CERT_PATH_VAR
            ))));
        }
    }
    if let Some(ca) = &config.engine.ca_path {
        if !Path::new(ca).is_file() {
            warn!("Configured CA file '{}' does not exist.", ca);
        }
    }
    info!("Configuration validation successful.");
    Ok(())
}
