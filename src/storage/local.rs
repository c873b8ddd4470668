// src/storage/local.rs

//! Local filesystem storage implementation.
//!
//! Paths are resolved against a root directory; absolute paths are used
//! as given.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::ItemRecord;
use crate::storage::{ResultStorage, WriteSummary};
use crate::utils::csv;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &Path) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &Path, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }
}

#[async_trait]
impl ResultStorage for LocalStorage {
    async fn write_table(
        &self,
        path: &Path,
        header: &[&str],
        rows: &[Vec<String>],
    ) -> Result<WriteSummary> {
        let text = csv::to_csv_string(header, rows);
        let written = self.write_bytes(path, text.as_bytes()).await?;
        log::info!("Table: {} row(s) written to {}", rows.len(), written.display());
        Ok(WriteSummary {
            location: written.to_string_lossy().into_owned(),
            count: rows.len(),
        })
    }

    async fn write_metadata(&self, path: &Path, items: &[ItemRecord]) -> Result<WriteSummary> {
        let bytes = serde_json::to_vec_pretty(items)?;
        let written = self.write_bytes(path, &bytes).await?;
        log::info!("Metadata: {} item(s) written to {}", items.len(), written.display());
        Ok(WriteSummary {
            location: written.to_string_lossy().into_owned(),
            count: items.len(),
        })
    }
}
