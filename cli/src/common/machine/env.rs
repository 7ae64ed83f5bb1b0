//! # docker-machine Environment Parser
//!
//! File: cli/src/common/machine/env.rs
//!
//! ## Overview
//!
//! `docker-machine env <name>` prints shell commands that export the
//! connection settings for a machine. The exact syntax depends on the shell the
//! tool detects:
//!
//! ```text
//! export DOCKER_HOST="tcp://192.168.99.100:2376"      # bash / zsh
//! SET DOCKER_HOST=tcp://192.168.99.100:2376           # cmd.exe
//! $Env:DOCKER_HOST = "tcp://192.168.99.100:2376"      # PowerShell
//! ```
//!
//! [`parse`] accepts all of these and returns a plain key/value map;
//! [`MachineEnvironment`] is the typed view the resolver works with.
//!
//! ## Rules
//!
//! - Blank lines, lines without `=`, and comments (`#`, `REM`) are ignored.
//! - A leading `$Env:`, `SET ` or `export ` is stripped, case-insensitively.
//! - The line is split on the first `=`; key and value are trimmed of
//!   whitespace and surrounding quotes.
//! - When a key repeats, the last occurrence wins.
//!
//! [`parse`] never fails. `DOCKER_HOST` and `DOCKER_MACHINE_NAME` are
//! enforced by [`MachineEnvironment::from_map`].
//!
use crate::core::error::{DockStationError, Result};
use anyhow::anyhow;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

pub const HOST_KEY: &str = "DOCKER_HOST";
pub const MACHINE_NAME_KEY: &str = "DOCKER_MACHINE_NAME";
pub const TLS_VERIFY_KEY: &str = "DOCKER_TLS_VERIFY";
pub const CERT_PATH_KEY: &str = "DOCKER_CERT_PATH";

const PREFIXES: [&str; 3] = ["$env:", "set ", "export "];

/// Parses `docker-machine env` output into a key/value map.
pub fn parse(raw: &str) -> HashMap<String, String> {
    let values: HashMap<String, String> = raw.lines().filter_map(parse_line).collect();
    debug!("Parsed {} environment entries", values.len());
    values
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || is_comment(line) {
        return None;
    }
    let line = strip_prefix(line);
    let (key, value) = line.split_once('=')?;
    let key = unquote(key);
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), unquote(value).to_string()))
}

fn is_comment(line: &str) -> bool {
    if line.starts_with('#') {
        return true;
    }
    match line.get(..3) {
        Some(head) if head.eq_ignore_ascii_case("rem") => {
            line.len() == 3 || line[3..].starts_with(char::is_whitespace)
        }
        _ => false,
    }
}

fn strip_prefix(line: &str) -> &str {
    for prefix in PREFIXES {
        if let Some(head) = line.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                return line[prefix.len()..].trim_start();
            }
        }
    }
    line
}

fn unquote(text: &str) -> &str {
    text.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

/// Typed connection settings for a provisioned machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineEnvironment {
    pub host: String,
    pub machine_name: String,
    pub tls_verify: bool,
    pub cert_path: Option<PathBuf>,
}

impl MachineEnvironment {
    /// Parses raw `env` output directly.
    pub fn parse(raw: &str) -> Result<Self> {
        Self::from_map(&parse(raw))
    }

    /// Builds the typed view from a parsed map.
    ///
    /// # Errors
    ///
    /// `MalformedEnvironment` naming the first of `DOCKER_HOST` and
    /// `DOCKER_MACHINE_NAME` that is absent, or `DOCKER_CERT_PATH` when TLS is
    /// requested without it.
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self> {
        let required = |key: &str| {
            values.get(key).cloned().ok_or_else(|| {
                anyhow!(DockStationError::MalformedEnvironment {
                    key: key.to_string(),
                })
            })
        };
        let host = required(HOST_KEY)?;
        let machine_name = required(MACHINE_NAME_KEY)?;
        let tls_verify = values
            .get(TLS_VERIFY_KEY)
            .is_some_and(|v| !v.trim().is_empty());
        let cert_path = values
            .get(CERT_PATH_KEY)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        if tls_verify && cert_path.is_none() {
            return Err(anyhow!(DockStationError::MalformedEnvironment {
                key: CERT_PATH_KEY.to_string(),
            }));
        }

        Ok(Self {
            host,
            machine_name,
            tls_verify,
            cert_path,
        })
    }
}
