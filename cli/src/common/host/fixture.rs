//! # Per-Process Engine Fixture
//!
//! File: cli/src/common/host/fixture.rs
//!
//! ## Overview
//!
//! Test suites need one engine endpoint for the whole run, not one per test.
//! `HostFixture` resolves the endpoint and connects to it on first use and
//! hands out the same `Endpoint` and `ContainerFactory` afterwards. A failed
//! resolution is not cached, so the next caller tries again.
//!
//! `HostFixture::shared()` is a process-wide instance built from
//! `load_config()`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dockstation::common::host::HostFixture;
//!
//! # async fn run_example() -> anyhow::Result<()> {
//! let fixture = HostFixture::shared()?;
//! let echo = fixture
//!     .factory()
//!     .await?
//!     .create_container("httpEcho", &[5678], "hashicorp/http-echo", &["-text=Hello".to_string()])
//!     .await?;
//! echo.dispose().await;
//! # Ok(())
//! # }
//! ```
//!
use super::endpoint::Endpoint;
use super::resolver::EndpointResolver;
use crate::common::docker::{connect_endpoint, ContainerFactory};
use crate::core::config::{load_config, Config};
use crate::core::error::Result;
use std::sync::{Arc, OnceLock};
use tokio::sync::OnceCell;
use tracing::info;

static SHARED: OnceLock<HostFixture> = OnceLock::new();

struct Connection {
    endpoint: Endpoint,
    factory: ContainerFactory,
}

/// Lazily resolved endpoint plus a container factory bound to it.
pub struct HostFixture {
    config: Config,
    connection: OnceCell<Connection>,
}

impl HostFixture {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            connection: OnceCell::new(),
        }
    }

    /// The process-wide fixture, configured from the environment and config files.
    pub fn shared() -> Result<&'static HostFixture> {
        if let Some(fixture) = SHARED.get() {
            return Ok(fixture);
        }
        let config = load_config()?;
        Ok(SHARED.get_or_init(|| HostFixture::new(config)))
    }

    pub async fn endpoint(&self) -> Result<&Endpoint> {
        Ok(&self.connection().await?.endpoint)
    }

    pub async fn factory(&self) -> Result<&ContainerFactory> {
        Ok(&self.connection().await?.factory)
    }

    async fn connection(&self) -> Result<&Connection> {
        self.connection
            .get_or_try_init(|| async {
                let endpoint = EndpointResolver::from_config(self.config.clone())
                    .resolve()
                    .await?;
                let docker = connect_endpoint(&endpoint, self.config.engine.timeout_secs)?;
                let factory = ContainerFactory::new(Arc::new(docker), endpoint.service_host())
                    .with_settings(&self.config.containers);
                info!("Engine fixture ready at {}", endpoint);
                Ok::<_, anyhow::Error>(Connection { endpoint, factory })
            })
            .await
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::host::Transport;

    fn explicit(host: &str) -> Config {
        let mut config = Config::default();
        config.engine.host = Some(host.to_string());
        config
    }

    #[tokio::test]
    async fn test_resolves_once() {
        let fixture = HostFixture::new(explicit("tcp://127.0.0.1:9"));

        let first = fixture.endpoint().await.unwrap();
        let second = fixture.endpoint().await.unwrap();

        assert!(std::ptr::eq(first, second));
        assert_eq!(first.transport, Transport::Tcp);
        assert_eq!(first.address, "tcp://127.0.0.1:9");
        assert_eq!(fixture.factory().await.unwrap().host(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_failed_resolution_is_not_cached() {
        let fixture = HostFixture::new(explicit("ftp://engine"));
        assert!(fixture.endpoint().await.is_err());
        assert!(fixture.endpoint().await.is_err());
    }
}
