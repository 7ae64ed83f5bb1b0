//! # DockStation Container Lifecycle Operations
//!
//! File: cli/src/common/docker/lifecycle.rs
//!
//! ## Overview
//!
//! Stopping and removing containers, with the tolerance teardown needs: the
//! goal of both calls is a state ("not running", "not present"), so engine
//! responses that say the state already holds are successes.
//!
//! | Call     | Treated as success                                      |
//! |----------|---------------------------------------------------------|
//! | stop     | 304 (already stopped), 404 (no such container)          |
//! | remove   | 404 (no such container), 409 "removal already in progress" |
//!
//! Everything else is returned as `DockStationError::DockerApi`.
//!
//! ## Architecture
//!
//! - **`stop_container`** / **`remove_container`**: Single calls with the tolerance above.
//! - **`teardown`**: Stop then remove.
//! - **`wait_for_removal`**: Polls the container list until a name disappears,
//!   bounded by a deadline, so a replacement can reuse the name.
//!
use super::engine::EngineClient;
use super::state::find_container_by_name;
use crate::core::error::{DockStationError, Result};
use anyhow::anyhow;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, instrument};

const REMOVAL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// True for remove responses that mean the container is, or is about to be, gone.
pub fn is_ignorable_removal_error(err: &bollard::errors::Error) -> bool {
    match err {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => true,
        bollard::errors::Error::DockerResponseServerError {
            status_code: 409,
            message,
        } => message.contains("already in progress"),
        _ => false,
    }
}

/// Stops a container, giving it `timeout_secs` to exit.
#[instrument(skip(engine))]
pub async fn stop_container(engine: &dyn EngineClient, id: &str, timeout_secs: i64) -> Result<()> {
    match engine.stop_container(id, timeout_secs).await {
        Ok(()) => {
            info!("Container '{}' stopped.", id);
            Ok(())
        }
        Err(bollard::errors::Error::DockerResponseServerError {
            status_code: 304, ..
        }) => {
            debug!("Container '{}' was already stopped.", id);
            Ok(())
        }
        Err(bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        }) => {
            debug!("Container '{}' no longer exists.", id);
            Ok(())
        }
        Err(e) => {
            error!("Failed to stop container '{}': {:?}", id, e);
            Err(anyhow!(DockStationError::DockerApi { source: e })
                .context(format!("Failed to stop container '{}'", id)))
        }
    }
}

/// Removes a container.
#[instrument(skip(engine))]
pub async fn remove_container(engine: &dyn EngineClient, id: &str) -> Result<()> {
    match engine.remove_container(id).await {
        Ok(()) => {
            info!("Container '{}' removed.", id);
            Ok(())
        }
        Err(e) if is_ignorable_removal_error(&e) => {
            debug!("Ignoring removal response for '{}': {}", id, e);
            Ok(())
        }
        Err(e) => {
            error!("Failed to remove container '{}': {:?}", id, e);
            Err(anyhow!(DockStationError::DockerApi { source: e })
                .context(format!("Failed to remove container '{}'", id)))
        }
    }
}

/// Stops then removes a container.
pub async fn teardown(engine: &dyn EngineClient, id: &str, stop_timeout_secs: i64) -> Result<()> {
    stop_container(engine, id, stop_timeout_secs).await?;
    remove_container(engine, id).await
}

/// Waits until no container named `name` is listed.
///
/// # Errors
///
/// `DockStationError::DockerOperation` if the name is still listed after `timeout`.
#[instrument(skip(engine))]
pub async fn wait_for_removal(engine: &dyn EngineClient, name: &str, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if find_container_by_name(engine, name).await?.is_none() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(anyhow!(DockStationError::DockerOperation(format!(
                "Container '{}' was still present {} ms after removal",
                name,
                timeout.as_millis()
            ))));
        }
        sleep(REMOVAL_POLL_INTERVAL).await;
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::docker::engine::fakes::{server_error, RecordingEngine};
    use bollard::container::Config as ContainerConfig;

    async fn engine_with_container(name: &str) -> (RecordingEngine, String) {
        let engine = RecordingEngine::default();
        let id = engine
            .create_container(name, ContainerConfig::default())
            .await
            .unwrap()
            .id;
        engine.start_container(&id).await.unwrap();
        (engine, id)
    }

    #[test]
    fn test_ignorable_removal_errors() {
        assert!(is_ignorable_removal_error(&server_error(404, "No such container")));
        assert!(is_ignorable_removal_error(&server_error(
            409,
            "removal of container abc is already in progress"
        )));
        assert!(!is_ignorable_removal_error(&server_error(
            409,
            "You cannot remove a running container"
        )));
        assert!(!is_ignorable_removal_error(&server_error(500, "boom")));
    }

    #[tokio::test]
    async fn test_teardown_twice_is_harmless() {
        let (engine, id) = engine_with_container("web").await;

        teardown(&engine, &id, 10).await.unwrap();
        teardown(&engine, &id, 10).await.unwrap();

        assert!(engine.containers().is_empty());
    }

    #[tokio::test]
    async fn test_stop_already_stopped_is_ok() {
        let (engine, id) = engine_with_container("web").await;
        stop_container(&engine, &id, 1).await.unwrap();
        // Second stop answers 304.
        stop_container(&engine, &id, 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_unexpected_removal_error_propagates() {
        let engine = RecordingEngine::failing_remove(500);
        let err = remove_container(&engine, "web").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DockStationError>(),
            Some(DockStationError::DockerApi { .. })
        ));
    }

    #[tokio::test]
    async fn test_wait_for_removal() {
        let (engine, id) = engine_with_container("web").await;

        let still_there = wait_for_removal(&engine, "web", Duration::from_millis(150)).await;
        assert!(still_there.is_err());

        teardown(&engine, &id, 1).await.unwrap();
        wait_for_removal(&engine, "web", Duration::from_millis(150))
            .await
            .unwrap();
    }
}
