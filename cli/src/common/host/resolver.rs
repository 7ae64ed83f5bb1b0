//! # Engine Endpoint Resolver
//!
//! File: cli/src/common/host/resolver.rs
//!
//! ## Overview
//!
//! `EndpointResolver` decides which container engine a test run talks to.
//! Resolution is a small forward-only state machine:
//!
//! ```text
//! Unresolved ──explicit host──────────────────────────────► Resolved
//!     │
//!     ▼
//! NativeProbe ──native socket/pipe exists─────────────────► Resolved
//!     │
//!     ▼
//! MachineProvisioning ──locate, ls, create/start, env─────► Resolved
//! ```
//!
//! The first matching strategy wins:
//!
//! 1. **Explicit host** (`DOCKER_HOST` or `engine.host`). TLS is used when
//!    `DOCKER_TLS_VERIFY` is set or the scheme is `https://`, with the
//!    identity built from `DOCKER_CERT_PATH`.
//! 2. **Native engine** at `engine.native_socket`.
//! 3. **docker-machine**: the machine `machine.name` is created if missing
//!    (driver from `DOCKER_MACHINE_DRIVER`/config, else `hyperv` on Windows and
//!    `virtualbox` elsewhere), started if stopped, and its `env` output turned
//!    into a TCP endpoint, with a credential bundle when TLS is indicated.
//!
//! A machine whose state cannot be determined is fatal
//! (`MachineStateUnknown`); tool failures surface as
//! `MachineToolExecutionFailure`. Nothing is retried.
//!
//! `resolve` consumes the resolver, so one resolver yields at most one endpoint.
//!
use super::endpoint::{Endpoint, Transport};
use crate::common::machine::{CommandLocator, MachineState, MachineTool};
use crate::common::network::{Downloader, HttpDownloader};
use crate::common::process::{CommandRunner, TokioCommandRunner};
use crate::common::system::{HostEnvironment, HostOs, SystemHost};
use crate::common::tls::CredentialBundler;
use crate::core::config::{Config, DOCKER_CERT_PATH_VAR};
use crate::core::error::{DockStationError, Result};
use anyhow::anyhow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const WINDOWS_DEFAULT_DRIVER: &str = "hyperv";
const DEFAULT_DRIVER: &str = "virtualbox";

/// Progress of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    NativeProbe,
    MachineProvisioning,
    Resolved(Endpoint),
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionState::Unresolved => write!(f, "unresolved"),
            ResolutionState::NativeProbe => write!(f, "native probe"),
            ResolutionState::MachineProvisioning => write!(f, "machine provisioning"),
            ResolutionState::Resolved(endpoint) => write!(f, "resolved ({})", endpoint),
        }
    }
}

/// Resolves the engine endpoint for this process.
pub struct EndpointResolver {
    config: Config,
    host: Arc<dyn HostEnvironment>,
    runner: Arc<dyn CommandRunner>,
    downloader: Arc<dyn Downloader>,
    bundler: CredentialBundler,
}

impl EndpointResolver {
    pub fn new(
        config: Config,
        host: Arc<dyn HostEnvironment>,
        runner: Arc<dyn CommandRunner>,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        let bundler =
            CredentialBundler::new().trust_anchor(config.engine.ca_path.as_ref().map(PathBuf::from));
        Self {
            config,
            host,
            runner,
            downloader,
            bundler,
        }
    }

    /// Resolver wired to the real host, processes and network.
    pub fn from_config(config: Config) -> Self {
        Self::new(
            config,
            Arc::new(SystemHost),
            Arc::new(TokioCommandRunner),
            Arc::new(HttpDownloader::new()),
        )
    }

    /// Replaces the credential bundler (e.g. to use a different codec).
    pub fn with_bundler(mut self, bundler: CredentialBundler) -> Self {
        self.bundler = bundler;
        self
    }

    /// Runs the state machine to completion.
    #[instrument(skip(self))]
    pub async fn resolve(self) -> Result<Endpoint> {
        let mut state = ResolutionState::Unresolved;
        loop {
            state = match state {
                ResolutionState::Resolved(endpoint) => {
                    info!("Resolved container engine endpoint: {}", endpoint);
                    return Ok(endpoint);
                }
                pending => {
                    let next = self.advance(pending).await?;
                    debug!("Resolution advanced to {}", next);
                    next
                }
            };
        }
    }

    /// Performs one transition.
    pub async fn advance(&self, state: ResolutionState) -> Result<ResolutionState> {
        match state {
            ResolutionState::Unresolved => match &self.config.engine.host {
                Some(host) => Ok(ResolutionState::Resolved(self.explicit_endpoint(host)?)),
                None => Ok(ResolutionState::NativeProbe),
            },
            ResolutionState::NativeProbe => {
                let native = &self.config.engine.native_socket;
                if self.host.path_exists(std::path::Path::new(native)) {
                    Ok(ResolutionState::Resolved(Endpoint::native(native)))
                } else {
                    debug!("No native engine at {}", native);
                    Ok(ResolutionState::MachineProvisioning)
                }
            }
            ResolutionState::MachineProvisioning => {
                Ok(ResolutionState::Resolved(self.provision_machine().await?))
            }
            resolved @ ResolutionState::Resolved(_) => Ok(resolved),
        }
    }

    fn explicit_endpoint(&self, host: &str) -> Result<Endpoint> {
        debug!("Using explicit engine host {}", host);
        let endpoint = Endpoint::from_host(host)?;
        let wants_tls = self.config.engine.tls_verify
            || host.trim().to_ascii_lowercase().starts_with("https://");
        if !wants_tls {
            return Ok(endpoint);
        }
        if endpoint.transport != Transport::Tcp {
            warn!(
                "TLS requested for {:?} endpoint {}; connecting without TLS",
                endpoint.transport, host
            );
            return Ok(endpoint);
        }
        let cert_dir = self.config.engine.cert_path.as_ref().ok_or_else(|| {
            anyhow!(DockStationError::Config(format!(
                "TLS is enabled for '{}' but {} is not set.",
                host, DOCKER_CERT_PATH_VAR
            )))
        })?;
        let bundle = self.bundler.build(std::path::Path::new(cert_dir))?;
        endpoint.with_tls(bundle)
    }

    fn driver(&self) -> String {
        match &self.config.machine.driver {
            Some(driver) => driver.clone(),
            None if self.host.os() == HostOs::Windows => WINDOWS_DEFAULT_DRIVER.to_string(),
            None => DEFAULT_DRIVER.to_string(),
        }
    }

    #[instrument(skip(self), fields(machine = %self.config.machine.name))]
    async fn provision_machine(&self) -> Result<Endpoint> {
        let locator = CommandLocator::from_config(
            &self.config.machine,
            self.host.clone(),
            self.downloader.clone(),
        )?;
        let tool = MachineTool::new(locator.locate().await?, self.runner.clone());
        let name = &self.config.machine.name;

        let machines = tool.list().await?;
        match machines.iter().find(|m| &m.name == name) {
            None => {
                tool.create(name, &self.driver(), &self.config.machine.hyperv_switch)
                    .await?;
            }
            Some(machine) => match machine.state {
                MachineState::Running => debug!("Machine '{}' is already running", name),
                MachineState::Stopped => tool.start(name).await?,
                MachineState::Unknown => {
                    return Err(anyhow!(DockStationError::MachineStateUnknown {
                        name: name.clone(),
                        driver: machine.driver.clone(),
                    }));
                }
            },
        }

        let env = tool.env(name).await?;
        let endpoint = Endpoint::from_host(&env.host)?;
        match (env.tls_verify, env.cert_path) {
            (true, Some(cert_dir)) => endpoint.with_tls(self.bundler.build(&cert_dir)?),
            _ => Ok(endpoint),
        }
    }
}
