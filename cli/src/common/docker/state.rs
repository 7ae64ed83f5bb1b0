//! # DockStation Container State Queries
//!
//! File: cli/src/common/docker/state.rs
//!
//! ## Overview
//!
//! Read-only queries over engine state used by the lifecycle flows:
//!
//! - **`find_container_by_name`**: The container whose name is exactly the
//!   requested one. The engine reports names with a leading `/`; substring
//!   matches (`web` vs `web-2`) never count.
//! - **`published_ports`**: The host ports bound for requested container
//!   ports, read from an inspect response, in request order.
//!
use super::engine::EngineClient;
use crate::core::error::{DockStationError, Result};
use anyhow::{anyhow, Context};
use bollard::models::{ContainerInspectResponse, ContainerSummary};
use tracing::{debug, instrument};

/// Docker key for a TCP container port, e.g. `5678/tcp`.
pub fn tcp_port_key(port: u16) -> String {
    format!("{}/tcp", port)
}

/// True when `summary` is named exactly `name`.
pub fn has_name(summary: &ContainerSummary, name: &str) -> bool {
    let wanted = name.trim_start_matches('/');
    summary
        .names
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|n| n.trim_start_matches('/') == wanted)
}

/// Looks up a container (running or stopped) by exact name.
#[instrument(skip(engine))]
pub async fn find_container_by_name(
    engine: &dyn EngineClient,
    name: &str,
) -> Result<Option<ContainerSummary>> {
    let containers = engine
        .list_containers()
        .await
        .map_err(|e| anyhow!(DockStationError::DockerApi { source: e }))
        .context("Failed to list containers")?;
    let found = containers.into_iter().find(|c| has_name(c, name));
    debug!(
        "Container '{}' {}",
        name,
        if found.is_some() { "exists" } else { "not found" }
    );
    Ok(found)
}

/// Host ports bound to `requested` container ports, in the same order.
///
/// # Errors
///
/// `DockStationError::DockerOperation` if a requested port has no host binding.
pub fn published_ports(inspect: &ContainerInspectResponse, requested: &[u16]) -> Result<Vec<u16>> {
    let port_map = inspect
        .network_settings
        .as_ref()
        .and_then(|settings| settings.ports.as_ref());

    requested
        .iter()
        .map(|&port| {
            let key = tcp_port_key(port);
            let host_port = port_map
                .and_then(|map| map.get(&key))
                .and_then(|bindings| bindings.as_ref())
                .and_then(|bindings| bindings.iter().find_map(|b| b.host_port.as_deref()))
                .ok_or_else(|| {
                    anyhow!(DockStationError::DockerOperation(format!(
                        "Container port {} has no published host port",
                        key
                    )))
                })?;
            host_port.parse::<u16>().map_err(|e| {
                anyhow!(DockStationError::DockerOperation(format!(
                    "Engine reported invalid host port '{}' for {}: {}",
                    host_port, key, e
                )))
            })
        })
        .collect()
}
