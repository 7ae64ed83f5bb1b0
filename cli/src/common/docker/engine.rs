//! # Container Engine Client Abstraction
//!
//! File: cli/src/common/docker/engine.rs
//!
//! ## Overview
//!
//! `EngineClient` is the narrow slice of the engine API the lifecycle manager
//! consumes. It is implemented for `bollard::Docker`; unit tests implement it
//! with an in-memory engine so container flows can be exercised without a
//! daemon.
//!
//! Methods return raw `bollard::errors::Error`s so callers can classify
//! responses by status code (304 already stopped, 404 gone, 409 conflict)
//! before wrapping them into `DockStationError::DockerApi`.
//!
use async_trait::async_trait;
use bollard::container::{
    Config as ContainerConfig, CreateContainerOptions, InspectContainerOptions,
    ListContainersOptions, RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::image::{CreateImageOptions, ListImagesOptions};
use bollard::models::{ContainerCreateResponse, ContainerInspectResponse, ContainerSummary};
use bollard::Docker;
use futures_util::stream::StreamExt;
use tracing::debug;

/// Result of a single engine call.
pub type EngineResult<T> = std::result::Result<T, bollard::errors::Error>;

/// Engine operations used by DockStation.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Every `repository:tag` reference known to the engine.
    async fn list_images(&self) -> EngineResult<Vec<String>>;
    /// Pulls `image:tag` and waits for the pull to finish.
    async fn pull_image(&self, image: &str, tag: &str) -> EngineResult<()>;
    /// All containers, running or not.
    async fn list_containers(&self) -> EngineResult<Vec<ContainerSummary>>;
    async fn create_container(
        &self,
        name: &str,
        config: ContainerConfig<String>,
    ) -> EngineResult<ContainerCreateResponse>;
    async fn start_container(&self, id: &str) -> EngineResult<()>;
    async fn stop_container(&self, id: &str, timeout_secs: i64) -> EngineResult<()>;
    async fn remove_container(&self, id: &str) -> EngineResult<()>;
    async fn inspect_container(&self, id: &str) -> EngineResult<ContainerInspectResponse>;
}

#[async_trait]
impl EngineClient for Docker {
    async fn list_images(&self) -> EngineResult<Vec<String>> {
        let options = Some(ListImagesOptions::<String> {
            all: false,
            ..Default::default()
        });
        let images = Docker::list_images(self, options).await?;
        Ok(images
            .into_iter()
            .flat_map(|summary| summary.repo_tags)
            .collect())
    }

    async fn pull_image(&self, image: &str, tag: &str) -> EngineResult<()> {
        let options = Some(CreateImageOptions {
            from_image: image.to_string(),
            tag: tag.to_string(),
            ..Default::default()
        });
        let mut progress = Box::pin(self.create_image(options, None, None));
        // Progress events are only drained; the first error aborts the pull.
        while let Some(event) = progress.next().await {
            let info = event?;
            if let Some(status) = info.status {
                debug!("pull {}:{}: {}", image, tag, status);
            }
        }
        Ok(())
    }

    async fn list_containers(&self) -> EngineResult<Vec<ContainerSummary>> {
        let options = Some(ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        });
        Docker::list_containers(self, options).await
    }

    async fn create_container(
        &self,
        name: &str,
        config: ContainerConfig<String>,
    ) -> EngineResult<ContainerCreateResponse> {
        let options = Some(CreateContainerOptions {
            name: name.to_string(),
            platform: None,
        });
        Docker::create_container(self, options, config).await
    }

    async fn start_container(&self, id: &str) -> EngineResult<()> {
        Docker::start_container(self, id, None::<StartContainerOptions<String>>).await
    }

    async fn stop_container(&self, id: &str, timeout_secs: i64) -> EngineResult<()> {
        let options = Some(StopContainerOptions { t: timeout_secs });
        Docker::stop_container(self, id, options).await
    }

    async fn remove_container(&self, id: &str) -> EngineResult<()> {
        let options = Some(RemoveContainerOptions {
            force: true,
            v: false,
            link: false,
        });
        Docker::remove_container(self, id, options).await
    }

    async fn inspect_container(&self, id: &str) -> EngineResult<ContainerInspectResponse> {
        Docker::inspect_container(self, id, None::<InspectContainerOptions>).await
    }
}
