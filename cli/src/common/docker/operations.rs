//! # DockStation Container Lifecycle Manager
//!
//! File: cli/src/common/docker/operations.rs
//!
//! ## Overview
//!
//! `ContainerFactory` creates named containers for tests and hands back a
//! `ContainerHandle` that guarantees the container is torn down again.
//!
//! ## Architecture
//!
//! `create_container(name, ports, image, args)` runs these steps in order,
//! one engine call at a time:
//!
//! 1. Pull `image` (tag `latest` if none given) unless the engine has it.
//! 2. If a container is named exactly `name`, stop and remove it, then wait
//!    until the name is no longer listed.
//! 3. Publish every requested port on the same host port on `0.0.0.0`.
//! 4. Create the container with publish-all-ports and auto-remove, then start it.
//!    A failed start is `DockStationError::ContainerStartFailure` and is not retried.
//! 5. Inspect the container and read back the bound host ports, in request order.
//!
//! A `ContainerHandle` is released in one of three ways:
//!
//! - **`dispose`**: Stops and removes the container; failures are logged only.
//! - **`detach`**: Leaves the container running; the engine removes it when it exits.
//! - **Drop** without either: the same teardown as `dispose`, spawned on the
//!   current tokio runtime so dropping never blocks. The spawned task is lost
//!   if the runtime shuts down first, so Drop is a fallback only.
//!
//! `with_container` is the scoped form: it creates the container, runs a body
//! against the handle and awaits `dispose` afterwards, whether the body
//! returned `Ok`, returned `Err` or panicked.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dockstation::common::docker::operations::ContainerFactory;
//! use std::sync::Arc;
//!
//! # async fn run_example(docker: bollard::Docker) -> anyhow::Result<()> {
//! let factory = ContainerFactory::new(Arc::new(docker), "localhost");
//! let url = factory
//!     .with_container(
//!         "httpEcho",
//!         &[5678],
//!         "hashicorp/http-echo",
//!         &["-text=Hello".to_string()],
//!         |echo| {
//!             Box::pin(async move {
//!                 Ok(format!("http://{}:{}/", echo.host(), echo.exposed_ports()[0]))
//!             })
//!         },
//!     )
//!     .await?;
//! println!("echo server was at {}", url);
//! # Ok(())
//! # }
//! ```
//!
use super::engine::EngineClient;
use super::images::ensure_image;
use super::lifecycle::{remove_container, teardown, wait_for_removal};
use super::state::{find_container_by_name, published_ports, tcp_port_key};
use crate::core::config::ContainersConfig;
use crate::core::error::{DockStationError, Result};
use anyhow::{anyhow, bail, Context};
use bollard::container::Config as ContainerConfig;
use bollard::models::{HostConfig, PortBinding, PortMap};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const BIND_ALL_INTERFACES: &str = "0.0.0.0";

/// Creates and replaces named containers on one engine.
#[derive(Clone)]
pub struct ContainerFactory {
    engine: Arc<dyn EngineClient>,
    host: String,
    stop_timeout_secs: i64,
    removal_wait: Duration,
}

impl ContainerFactory {
    /// `service_host` is the host name published ports are reached on
    /// (see `Endpoint::service_host`).
    pub fn new(engine: Arc<dyn EngineClient>, service_host: impl Into<String>) -> Self {
        Self {
            engine,
            host: service_host.into(),
            stop_timeout_secs: 0,
            removal_wait: Duration::ZERO,
        }
        .with_settings(&ContainersConfig::default())
    }

    /// Applies the `[containers]` settings.
    pub fn with_settings(mut self, settings: &ContainersConfig) -> Self {
        self.stop_timeout_secs = settings.stop_timeout_secs;
        self.removal_wait = Duration::from_millis(settings.removal_wait_ms);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Creates and starts `name` from `image`, replacing any container of the same name.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty name or port list.
    /// - `ContainerStartFailure` if the engine refuses to start the container.
    /// - `DockerApi` / `DockerOperation` for any other engine failure.
    #[instrument(skip(self, args), fields(image = %image))]
    pub async fn create_container(
        &self,
        name: &str,
        ports: &[u16],
        image: &str,
        args: &[String],
    ) -> Result<ContainerHandle> {
        if name.trim().is_empty() {
            bail!(DockStationError::InvalidArgument(
                "Container name cannot be empty".to_string()
            ));
        }
        if ports.is_empty() {
            bail!(DockStationError::InvalidArgument(format!(
                "Container '{}' must publish at least one port",
                name
            )));
        }
        let engine = self.engine.as_ref();

        ensure_image(engine, image).await?;

        if let Some(existing) = find_container_by_name(engine, name).await? {
            let existing_id = existing.id.unwrap_or_else(|| name.to_string());
            info!("Replacing existing container '{}' ({})", name, existing_id);
            teardown(engine, &existing_id, self.stop_timeout_secs).await?;
            wait_for_removal(engine, name, self.removal_wait).await?;
        }

        let config = container_config(image, ports, args);
        let created = engine
            .create_container(name, config)
            .await
            .map_err(|e| anyhow!(DockStationError::DockerApi { source: e }))
            .with_context(|| format!("Failed to create container '{}'", name))?;
        for warning in &created.warnings {
            warn!("Engine warning for '{}': {}", name, warning);
        }

        if let Err(source) = engine.start_container(&created.id).await {
            // Never started, so auto-remove will not clean it up.
            if let Err(e) = remove_container(engine, &created.id).await {
                warn!("Could not remove unstarted container '{}': {:#}", name, e);
            }
            return Err(anyhow!(DockStationError::ContainerStartFailure {
                name: name.to_string(),
                source,
            }));
        }
        info!("Started container '{}' ({})", name, created.id);

        let inspect = engine
            .inspect_container(&created.id)
            .await
            .map_err(|e| anyhow!(DockStationError::DockerApi { source: e }))
            .with_context(|| format!("Failed to inspect container '{}'", name))?;
        let exposed_ports = published_ports(&inspect, ports)?;
        debug!("Container '{}' published ports {:?}", name, exposed_ports);

        Ok(ContainerHandle {
            id: inspect.id.unwrap_or(created.id),
            name: name.to_string(),
            host: self.host.clone(),
            exposed_ports,
            engine: self.engine.clone(),
            stop_timeout_secs: self.stop_timeout_secs,
            armed: true,
        })
    }

    /// Creates `name` as `create_container` does, runs `body` against it and
    /// disposes of the container before returning the body's result.
    ///
    /// Disposal is awaited on every exit path. A panicking body is caught,
    /// the container is disposed of, and the panic is then resumed.
    ///
    /// # Errors
    ///
    /// Any error from `create_container` (the body is not run), otherwise
    /// the body's own error.
    pub async fn with_container<T, F>(
        &self,
        name: &str,
        ports: &[u16],
        image: &str,
        args: &[String],
        body: F,
    ) -> Result<T>
    where
        F: for<'h> FnOnce(&'h ContainerHandle) -> BoxFuture<'h, Result<T>>,
    {
        let handle = self.create_container(name, ports, image, args).await?;
        let outcome = AssertUnwindSafe(body(&handle)).catch_unwind().await;
        handle.dispose().await;
        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    /// Stops and removes a container by name or id. Absent containers are not an error.
    #[instrument(skip(self))]
    pub async fn remove_container(&self, name_or_id: &str) -> Result<()> {
        let engine = self.engine.as_ref();
        let id = match find_container_by_name(engine, name_or_id).await? {
            Some(summary) => summary.id.unwrap_or_else(|| name_or_id.to_string()),
            None => name_or_id.to_string(),
        };
        teardown(engine, &id, self.stop_timeout_secs).await
    }
}

fn container_config(image: &str, ports: &[u16], args: &[String]) -> ContainerConfig<String> {
    let mut exposed_ports: HashMap<String, HashMap<(), ()>> = HashMap::new();
    let mut port_bindings: PortMap = HashMap::new();
    for &port in ports {
        let key = tcp_port_key(port);
        exposed_ports.insert(key.clone(), HashMap::new());
        port_bindings.insert(
            key,
            Some(vec![PortBinding {
                host_ip: Some(BIND_ALL_INTERFACES.to_string()),
                host_port: Some(port.to_string()),
            }]),
        );
    }

    ContainerConfig {
        image: Some(image.to_string()),
        cmd: if args.is_empty() {
            None
        } else {
            Some(args.to_vec())
        },
        exposed_ports: Some(exposed_ports),
        host_config: Some(HostConfig {
            port_bindings: Some(port_bindings),
            publish_all_ports: Some(true),
            auto_remove: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// A started container. Tearing it down is guaranteed unless `detach` is called.
pub struct ContainerHandle {
    id: String,
    name: String,
    host: String,
    exposed_ports: Vec<u16>,
    engine: Arc<dyn EngineClient>,
    stop_timeout_secs: i64,
    armed: bool,
}

impl fmt::Debug for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("host", &self.host)
            .field("exposed_ports", &self.exposed_ports)
            .finish_non_exhaustive()
    }
}

impl ContainerHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host the published ports are reachable on.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Host ports, one per requested container port, in request order.
    pub fn exposed_ports(&self) -> &[u16] {
        &self.exposed_ports
    }

    /// Stops and removes the container. Failures are logged, never returned.
    #[instrument(skip(self), fields(container = %self.name))]
    pub async fn dispose(mut self) {
        if let Err(e) = teardown(self.engine.as_ref(), &self.id, self.stop_timeout_secs).await {
            warn!("Failed to clean up container '{}': {:#}", self.name, e);
        }
        self.armed = false;
    }

    /// Releases the handle without tearing the container down and returns its id.
    pub fn detach(mut self) -> String {
        self.armed = false;
        std::mem::take(&mut self.id)
    }
}

impl Drop for ContainerHandle {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let engine = self.engine.clone();
        let id = self.id.clone();
        let name = self.name.clone();
        let stop_timeout_secs = self.stop_timeout_secs;
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                debug!("Handle for '{}' dropped; scheduling cleanup", name);
                runtime.spawn(async move {
                    if let Err(e) = teardown(engine.as_ref(), &id, stop_timeout_secs).await {
                        warn!("Failed to clean up container '{}': {:#}", name, e);
                    }
                });
            }
            Err(_) => warn!(
                "Handle for '{}' dropped outside a tokio runtime; container {} was not cleaned up",
                name, id
            ),
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::docker::engine::fakes::RecordingEngine;

    const ECHO_IMAGE: &str = "hashicorp/http-echo";

    fn factory(engine: &Arc<RecordingEngine>) -> ContainerFactory {
        ContainerFactory::new(engine.clone(), "localhost").with_settings(&ContainersConfig {
            stop_timeout_secs: 1,
            removal_wait_ms: 200,
        })
    }

    fn echo_args() -> Vec<String> {
        vec!["-text=Hello".to_string()]
    }

    #[tokio::test]
    async fn test_create_on_clean_engine() {
        let engine = Arc::new(RecordingEngine::default());

        let handle = factory(&engine)
            .create_container("httpEcho", &[5678], ECHO_IMAGE, &echo_args())
            .await
            .unwrap();

        assert_eq!(handle.exposed_ports(), &[5678]);
        assert_eq!(handle.host(), "localhost");
        assert_eq!(handle.name(), "httpEcho");

        let containers = engine.containers();
        assert_eq!(containers.len(), 1);
        let container = &containers[0];
        assert_eq!(container.id, handle.id());
        assert!(container.running);
        assert_eq!(container.image, ECHO_IMAGE);
        assert_eq!(container.cmd, echo_args());
        let binding = container.port_bindings["5678/tcp"].as_ref().unwrap();
        assert_eq!(binding[0].host_ip.as_deref(), Some("0.0.0.0"));
        assert_eq!(binding[0].host_port.as_deref(), Some("5678"));

        assert!(engine
            .calls()
            .contains(&"pull hashicorp/http-echo:latest".to_string()));
        handle.detach();
    }

    #[tokio::test]
    async fn test_ports_keep_request_order() {
        let engine = Arc::new(RecordingEngine::with_images(&["nginx:latest"]));
        let handle = factory(&engine)
            .create_container("web", &[8080, 80, 443], "nginx", &[])
            .await
            .unwrap();
        assert_eq!(handle.exposed_ports(), &[8080, 80, 443]);
        assert!(engine.containers()[0].cmd.is_empty());
        handle.dispose().await;
    }

    #[tokio::test]
    async fn test_create_twice_replaces_first() {
        let engine = Arc::new(RecordingEngine::default());
        let factory = factory(&engine);

        let first = factory
            .create_container("httpEcho", &[5678], ECHO_IMAGE, &echo_args())
            .await
            .unwrap();
        let first_id = first.detach();

        let second = factory
            .create_container("httpEcho", &[5678], ECHO_IMAGE, &echo_args())
            .await
            .unwrap();

        assert_ne!(second.id(), first_id);
        let containers = engine.containers();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].id, second.id());

        let calls = engine.calls();
        let position = |call: String| calls.iter().position(|c| *c == call).unwrap();
        let stop_first = position(format!("stop {}", first_id));
        let remove_first = position(format!("remove {}", first_id));
        let create_second = calls
            .iter()
            .rposition(|c| c == "create httpEcho")
            .unwrap();
        assert!(stop_first < remove_first);
        assert!(remove_first < create_second);
        // The image is pulled only once.
        assert_eq!(calls.iter().filter(|c| c.starts_with("pull ")).count(), 1);

        second.dispose().await;
    }

    #[tokio::test]
    async fn test_dispose_removes_container() {
        let engine = Arc::new(RecordingEngine::default());
        let factory = factory(&engine);
        let handle = factory
            .create_container("httpEcho", &[5678], ECHO_IMAGE, &echo_args())
            .await
            .unwrap();
        let id = handle.id().to_string();

        handle.dispose().await;

        assert!(engine.containers().is_empty());
        // Removing again by name or id does not raise.
        factory.remove_container("httpEcho").await.unwrap();
        factory.remove_container(&id).await.unwrap();
    }

    #[tokio::test]
    async fn test_drop_without_dispose_schedules_cleanup() {
        let engine = Arc::new(RecordingEngine::default());
        let handle = factory(&engine)
            .create_container("httpEcho", &[5678], ECHO_IMAGE, &echo_args())
            .await
            .unwrap();

        drop(handle);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(engine.containers().is_empty());
    }

    #[tokio::test]
    async fn test_detach_leaves_container() {
        let engine = Arc::new(RecordingEngine::default());
        let handle = factory(&engine)
            .create_container("httpEcho", &[5678], ECHO_IMAGE, &echo_args())
            .await
            .unwrap();

        let id = handle.detach();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(engine.containers()[0].id, id);
    }

    #[tokio::test]
    async fn test_start_failure() {
        let engine = Arc::new(RecordingEngine::failing_start(500));

        let err = factory(&engine)
            .create_container("httpEcho", &[5678], ECHO_IMAGE, &[])
            .await
            .unwrap_err();

        match err.downcast_ref::<DockStationError>() {
            Some(DockStationError::ContainerStartFailure { name, .. }) => {
                assert_eq!(name, "httpEcho")
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // Started exactly once and not left behind.
        let starts = engine
            .calls()
            .iter()
            .filter(|c| c.starts_with("start "))
            .count();
        assert_eq!(starts, 1);
        assert!(engine.containers().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let engine = Arc::new(RecordingEngine::default());
        let factory = factory(&engine);

        for result in [
            factory.create_container("web", &[], "nginx", &[]).await,
            factory.create_container(" ", &[80], "nginx", &[]).await,
        ] {
            assert!(matches!(
                result.unwrap_err().downcast_ref::<DockStationError>(),
                Some(DockStationError::InvalidArgument(_))
            ));
        }
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_replacement_failure_propagates() {
        let engine = Arc::new(RecordingEngine::failing_remove(500));
        let factory = factory(&engine);
        factory
            .create_container("web", &[80], "nginx", &[])
            .await
            .unwrap()
            .detach();

        let err = factory
            .create_container("web", &[80], "nginx", &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DockStationError>(),
            Some(DockStationError::DockerApi { .. })
        ));
    }

    #[tokio::test]
    async fn test_with_container_disposes_after_body() {
        let engine = Arc::new(RecordingEngine::default());

        let port = factory(&engine)
            .with_container("httpEcho", &[5678], ECHO_IMAGE, &echo_args(), |echo| {
                Box::pin(async move {
                    assert_eq!(echo.name(), "httpEcho");
                    Ok(echo.exposed_ports()[0])
                })
            })
            .await
            .unwrap();

        assert_eq!(port, 5678);
        assert!(engine.containers().is_empty());
    }

    #[tokio::test]
    async fn test_with_container_disposes_when_body_fails() {
        let engine = Arc::new(RecordingEngine::default());

        let err = factory(&engine)
            .with_container("httpEcho", &[5678], ECHO_IMAGE, &echo_args(), |_| {
                Box::pin(async { Err::<(), _>(anyhow!("assertion against echo failed")) })
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "assertion against echo failed");
        assert!(engine.containers().is_empty());
    }

    #[tokio::test]
    async fn test_with_container_skips_body_when_creation_fails() {
        let engine = Arc::new(RecordingEngine::failing_start(500));
        let mut ran = false;

        let result: Result<()> = factory(&engine)
            .with_container("httpEcho", &[5678], ECHO_IMAGE, &[], |_| {
                ran = true;
                Box::pin(async { Ok(()) })
            })
            .await;

        assert!(result.is_err());
        assert!(!ran);
    }

    #[test]
    fn test_with_container_cleans_up_before_runtime_exits() {
        let engine = Arc::new(RecordingEngine::default());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime
            .block_on(factory(&engine).with_container(
                "httpEcho",
                &[5678],
                ECHO_IMAGE,
                &echo_args(),
                |_| Box::pin(async { Ok(()) }),
            ))
            .unwrap();
        drop(runtime);

        assert!(engine.containers().is_empty());
    }

    #[test]
    fn test_with_container_cleans_up_after_panic() {
        let engine = Arc::new(RecordingEngine::default());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let outcome: std::thread::Result<Result<()>> =
            std::panic::catch_unwind(AssertUnwindSafe(|| {
                runtime.block_on(factory(&engine).with_container(
                    "httpEcho",
                    &[5678],
                    ECHO_IMAGE,
                    &echo_args(),
                    |echo| {
                        Box::pin(async move {
                            assert_eq!(echo.exposed_ports(), &[1], "unexpected published port");
                            Ok(())
                        })
                    },
                ))
            }));
        drop(runtime);

        assert!(outcome.is_err());
        assert!(engine.containers().is_empty());
        assert!(engine.calls().iter().any(|c| c.starts_with("remove ")));
    }
}
