// src/services/fetcher.rs

//! Artifact retrieval and rendering.

use std::path::{Path, PathBuf};

use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::utils::filename::write_unique;

use super::render::DocumentRenderer;
use super::resolver::{ArtifactLocation, MarkupDocument};

/// A file written by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    pub path: PathBuf,
    pub bytes: usize,
    pub sha256: String,
}

impl FetchedArtifact {
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Downloads remote artifacts and renders captured ones, one file per call.
pub struct ArtifactFetcher {
    client: Client,
    download_dir: PathBuf,
    render_dir: PathBuf,
    renderer: Box<dyn DocumentRenderer>,
}

impl ArtifactFetcher {
    pub fn new(
        client: Client,
        download_dir: impl Into<PathBuf>,
        render_dir: impl Into<PathBuf>,
        renderer: Box<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            client,
            download_dir: download_dir.into(),
            render_dir: render_dir.into(),
            renderer,
        }
    }

    /// Produce the artifact for `location` under a name built from `stem`.
    pub async fn fetch(&self, location: &ArtifactLocation, stem: &str) -> Result<FetchedArtifact> {
        match location {
            ArtifactLocation::Remote(url) => self.download(url, stem).await,
            ArtifactLocation::Markup(document) => self.render(document, stem).await,
        }
    }

    /// Anything but a 200 response is a failure.
    async fn download(&self, url: &str, stem: &str) -> Result<FetchedArtifact> {
        log::info!("Downloading {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::download(url, e))?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::download(url, e))?;
        persist(&self.download_dir, stem, extension_of(url), &body).await
    }

    async fn render(&self, document: &MarkupDocument, stem: &str) -> Result<FetchedArtifact> {
        let bytes = self.renderer.render(document)?;
        persist(&self.render_dir, stem, self.renderer.extension(), &bytes).await
    }
}

async fn persist(dir: &Path, stem: &str, ext: &str, bytes: &[u8]) -> Result<FetchedArtifact> {
    let path = write_unique(dir, stem, ext, bytes).await?;
    let sha256 = hex::encode(Sha256::digest(bytes));
    log::debug!("Saved {} ({} bytes, sha256 {})", path.display(), bytes.len(), sha256);
    Ok(FetchedArtifact {
        path,
        bytes: bytes.len(),
        sha256,
    })
}

/// Extension of the URL path's last segment, `pdf` when there is none.
fn extension_of(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    match last.rsplit_once('.') {
        Some((name, ext)) if !name.is_empty() && !ext.is_empty() => ext,
        _ => "pdf",
    }
}
