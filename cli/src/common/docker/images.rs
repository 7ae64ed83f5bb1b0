//! # DockStation Image Operations
//!
//! File: cli/src/common/docker/images.rs
//!
//! ## Overview
//!
//! Makes sure the image a container is created from is present on the
//! engine. References are compared in normalized form: a reference without a
//! tag means `:latest`, so `hashicorp/http-echo` and `hashicorp/http-echo:latest`
//! are the same image.
//!
//! ## Architecture
//!
//! - **`normalize_reference`**: Appends `:latest` to untagged references.
//! - **`split_reference`**: Splits a reference into the repository and tag a pull needs.
//! - **`ensure_image`**: Lists local images and pulls the image only when it is absent.
//!
use super::engine::EngineClient;
use crate::core::error::{DockStationError, Result};
use anyhow::{anyhow, Context};
use tracing::{debug, info, instrument};

const DEFAULT_TAG: &str = "latest";

/// True when the last path segment of `image` carries a tag or the reference
/// is pinned by digest.
fn has_tag(image: &str) -> bool {
    let last_segment = image.rsplit('/').next().unwrap_or(image);
    last_segment.contains(':') || image.contains('@')
}

/// `image` with `:latest` appended when it has no tag.
pub fn normalize_reference(image: &str) -> String {
    if has_tag(image) {
        image.to_string()
    } else {
        format!("{}:{}", image, DEFAULT_TAG)
    }
}

/// Splits `repo[:tag]` into `(repo, tag)`, defaulting the tag to `latest`.
/// Digest references are returned whole with an empty tag.
pub fn split_reference(image: &str) -> (String, String) {
    if image.contains('@') {
        return (image.to_string(), String::new());
    }
    let slash = image.rfind('/').map_or(0, |i| i + 1);
    match image[slash..].rfind(':') {
        Some(colon) => {
            let at = slash + colon;
            (image[..at].to_string(), image[at + 1..].to_string())
        }
        None => (image.to_string(), DEFAULT_TAG.to_string()),
    }
}

/// Pulls `image` unless the engine already has it. Pull progress is discarded.
///
/// # Errors
///
/// Returns `DockStationError::DockerApi` if listing or pulling fails.
#[instrument(skip(engine))]
pub async fn ensure_image(engine: &dyn EngineClient, image: &str) -> Result<()> {
    let wanted = normalize_reference(image);
    let present = engine
        .list_images()
        .await
        .map_err(|e| anyhow!(DockStationError::DockerApi { source: e }))
        .context("Failed to list images")?
        .iter()
        .any(|tag| normalize_reference(tag) == wanted);
    if present {
        debug!("Image {} is already present", wanted);
        return Ok(());
    }

    let (repository, tag) = split_reference(image);
    info!("Pulling image {} ...", wanted);
    engine
        .pull_image(&repository, &tag)
        .await
        .map_err(|e| anyhow!(DockStationError::DockerApi { source: e }))
        .with_context(|| format!("Failed to pull image '{}'", wanted))?;
    info!("Pulled image {}", wanted);
    Ok(())
}
