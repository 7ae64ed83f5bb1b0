//! # DockStation End-to-End Container Test
//!
//! File: cli/tests/http_echo.rs
//!
//! ## Overview
//!
//! Drives the library against a real engine: resolves the endpoint the same
//! way a test suite would, runs `hashicorp/http-echo` inside
//! `ContainerFactory::with_container`, calls it over HTTP and checks the
//! container is gone once the scope ends.
//!
//! **Note:** Requires a reachable container engine (or docker-machine and a
//! hypervisor) and network access to pull the image, so it is `#[ignore]`d.
//! Run with `cargo test --test http_echo -- --ignored`.
//!

use dockstation::common::docker::{connect_endpoint, ContainerFactory, EngineClient};
use dockstation::common::host::EndpointResolver;
use dockstation::core::config::load_config;
use std::sync::Arc;

const ECHO_NAME: &str = "dockstationHttpEcho";

#[tokio::test]
#[ignore] // Requires a container engine.
async fn test_http_echo_round_trip() {
    let config = load_config().unwrap();
    let endpoint = EndpointResolver::from_config(config.clone())
        .resolve()
        .await
        .unwrap();
    let docker = Arc::new(connect_endpoint(&endpoint, config.engine.timeout_secs).unwrap());
    let factory = ContainerFactory::new(docker.clone(), endpoint.service_host())
        .with_settings(&config.containers);

    let body = factory
        .with_container(
            ECHO_NAME,
            &[5678],
            "hashicorp/http-echo",
            &["-text=Hello".to_string()],
            |echo| {
                Box::pin(async move {
                    assert_eq!(echo.exposed_ports(), &[5678]);
                    let url = format!("http://{}:{}/", echo.host(), echo.exposed_ports()[0]);
                    // The server needs a moment after the container starts.
                    let mut last_error = None;
                    for _ in 0..20 {
                        match reqwest::get(&url).await {
                            Ok(response) => return Ok(response.text().await?),
                            Err(e) => {
                                last_error = Some(e);
                                tokio::time::sleep(std::time::Duration::from_millis(250)).await
                            }
                        }
                    }
                    Err(anyhow::anyhow!("{} never answered: {:?}", url, last_error))
                })
            },
        )
        .await
        .unwrap();
    assert_eq!(body.trim(), "Hello");

    let remaining = EngineClient::list_containers(docker.as_ref()).await.unwrap();
    assert!(!remaining.iter().any(|c| c
        .names
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|n| n.trim_start_matches('/') == ECHO_NAME)));
}
