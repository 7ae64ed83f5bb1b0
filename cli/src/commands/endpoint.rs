//! # DockStation Endpoint Command
//!
//! File: cli/src/commands/endpoint.rs
//!
//! ## Overview
//!
//! Implements `dockstation endpoint`: resolves the engine endpoint exactly as
//! a test suite would (provisioning a docker-machine VM if nothing else is
//! available) and prints it.
//!
//! ## Usage
//!
//! ```bash
//! # Print the endpoint URI
//! dockstation endpoint
//!
//! # Print DOCKER_* variables for other tools
//! dockstation endpoint --env
//! ```
//!
use anyhow::Context;
use clap::Parser;
use dockstation::common::host::{Endpoint, EndpointResolver};
use dockstation::core::config;
use dockstation::core::error::Result;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Resolve the container engine endpoint and print it")]
pub struct EndpointArgs {
    /// Print `DOCKER_HOST`, `DOCKER_TLS_VERIFY` and `DOCKER_CERT_PATH` lines instead of the URI.
    #[arg(long)]
    env: bool,
}

pub async fn handle_endpoint(args: EndpointArgs) -> Result<()> {
    let cfg = config::load_config().context("Failed to load DockStation configuration")?;
    let endpoint = EndpointResolver::from_config(cfg).resolve().await?;
    info!("Endpoint resolved: {}", endpoint);
    println!("{}", render(&endpoint, args.env));
    Ok(())
}

fn render(endpoint: &Endpoint, as_env: bool) -> String {
    if !as_env {
        return endpoint.to_string();
    }
    let mut lines = vec![format!("DOCKER_HOST={}", endpoint.uri())];
    if let Some(tls) = &endpoint.tls {
        lines.push("DOCKER_TLS_VERIFY=1".to_string());
        if let Some(dir) = tls.bundle_path.parent() {
            lines.push(format!("DOCKER_CERT_PATH={}", dir.display()));
        }
    }
    lines.join("\n")
}
