//! # DockStation Engine Connection Helper
//!
//! File: cli/src/common/docker/connect.rs
//!
//! ## Overview
//!
//! Turns a resolved [`Endpoint`] into a `bollard::Docker` client. The
//! transport decides the constructor:
//!
//! - `LocalSocket` / `NamedPipe`: `Docker::connect_with_socket`
//! - `Tcp` without TLS: `Docker::connect_with_http`
//! - `Tcp` with TLS: `Docker::connect_with_custom_transport` over a
//!   `hyper-rustls` connector. The credential bundle is the client identity.
//!   The engine certificate is verified against the bundle's trust anchor
//!   when it has one and accepted as presented otherwise (see
//!   `tls::client::client_config`).
//!
//! Constructing a client does not contact the engine; the first API call does.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dockstation::common::docker::connect::connect_endpoint;
//! use dockstation::common::host::Endpoint;
//!
//! # fn run_example() -> anyhow::Result<()> {
//! let endpoint = Endpoint::native("/var/run/docker.sock");
//! let docker = connect_endpoint(&endpoint, 120)?;
//! # Ok(())
//! # }
//! ```
//!
use crate::common::host::{Endpoint, Transport};
use crate::common::tls::client::client_config;
use crate::common::tls::CredentialBundle;
use crate::core::error::{DockStationError, Result};
use anyhow::{anyhow, Context};
use bollard::{BollardRequest, Docker, API_DEFAULT_VERSION};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Creates an engine client for `endpoint`.
///
/// # Errors
///
/// Returns an `Err` if the credential files cannot be loaded, or one wrapping
/// `DockStationError::DockerApi` if the client cannot be constructed.
#[instrument(skip(endpoint), fields(endpoint = %endpoint))]
pub fn connect_endpoint(endpoint: &Endpoint, timeout_secs: u64) -> Result<Docker> {
    let client = match (endpoint.transport, &endpoint.tls) {
        (Transport::Tcp, Some(tls)) => connect_with_tls(&endpoint.address, tls, timeout_secs),
        (Transport::Tcp, None) => {
            Docker::connect_with_http(&endpoint.address, timeout_secs, API_DEFAULT_VERSION)
                .map_err(api_error)
        }
        (Transport::LocalSocket | Transport::NamedPipe, _) => {
            Docker::connect_with_socket(&endpoint.address, timeout_secs, API_DEFAULT_VERSION)
                .map_err(api_error)
        }
    };
    client.with_context(|| format!("Failed to create engine client for {}", endpoint))
}

fn api_error(source: bollard::errors::Error) -> anyhow::Error {
    anyhow!(DockStationError::DockerApi { source })
}

fn connect_with_tls(
    address: &str,
    tls: &CredentialBundle,
    timeout_secs: u64,
) -> Result<Docker> {
    debug!(
        "Connecting over TLS with identity {}",
        tls.bundle_path.display()
    );
    let connector = HttpsConnectorBuilder::new()
        .with_tls_config(client_config(tls)?)
        .https_only()
        .enable_http1()
        .build();
    let mut builder = Client::builder(TokioExecutor::new());
    builder.pool_max_idle_per_host(0);
    let client = Arc::new(builder.build(connector));

    Docker::connect_with_custom_transport(
        move |request: BollardRequest| {
            let client = Arc::clone(&client);
            async move {
                client
                    .request(request)
                    .await
                    .map_err(bollard::errors::Error::from)
            }
        },
        Some(https_address(address)),
        timeout_secs,
        API_DEFAULT_VERSION,
    )
    .map_err(api_error)
}

/// `tcp://host:port` as the `https://` base URL the TLS transport expects.
fn https_address(address: &str) -> String {
    let authority = address
        .strip_prefix("tcp://")
        .or_else(|| address.strip_prefix("https://"))
        .unwrap_or(address);
    format!("https://{}", authority.trim_end_matches('/'))
}
