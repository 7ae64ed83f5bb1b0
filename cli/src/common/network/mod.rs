//! # DockStation Network Utilities Module (`common::network`)
//!
//! File: cli/src/common/network/mod.rs
//!
//! ## Overview
//!
//! This module provides the byte-transfer collaborator used to fetch the
//! docker-machine executable when it is neither on `PATH` nor cached in the
//! working directory.
//!
//! ## Architecture
//!
//! - **`Downloader`**: `download(url, destination)`. The locator depends on the
//!   trait only, so tests can record requested URLs without touching the network.
//! - **`HttpDownloader`**: `reqwest` implementation. Non-success HTTP statuses
//!   are errors; the body is persisted with `fs::io::write_atomically` so an
//!   interrupted download never leaves a truncated executable behind.
//!
use crate::common::fs::io::write_atomically;
use crate::core::error::Result;
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Fetches a remote resource into a local file.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str, destination: &Path) -> Result<()>;
}

/// `Downloader` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    #[instrument(skip(self, destination), fields(destination = %destination.display()))]
    async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        info!("Downloading {} ...", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to '{}' failed", url))?
            .error_for_status()
            .with_context(|| format!("Server rejected download of '{}'", url))?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from '{}'", url))?;

        let target: PathBuf = destination.to_path_buf();
        let size = body.len();
        tokio::task::spawn_blocking(move || write_atomically(&target, &body))
            .await
            .context("Download writer task panicked")??;
        info!("Downloaded {} bytes to {}", size, destination.display());
        Ok(())
    }
}
