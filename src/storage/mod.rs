// src/storage/mod.rs

//! Storage abstractions for run results.
//!
//! A run is persisted once, at its end: the record table as CSV and, for
//! the render variant, a JSON metadata sidecar. Existing files are replaced
//! in one step.

pub mod local;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ItemRecord, TableRow};

pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Where the data ended up
    pub location: String,
    /// Number of records written
    pub count: usize,
}

/// Trait for result storage backends.
#[async_trait]
pub trait ResultStorage: Send + Sync {
    /// Write a flat table: one header line, then one line per row.
    async fn write_table(
        &self,
        path: &Path,
        header: &[&str],
        rows: &[Vec<String>],
    ) -> Result<WriteSummary>;

    /// Write item metadata as an indented JSON array.
    async fn write_metadata(&self, path: &Path, items: &[ItemRecord]) -> Result<WriteSummary>;
}

/// Write `records` as a table with their fixed column order.
pub async fn save_records<R: TableRow>(
    storage: &dyn ResultStorage,
    path: &Path,
    records: &[R],
) -> Result<WriteSummary> {
    let rows: Vec<Vec<String>> = records.iter().map(|r| r.cells()).collect();
    storage.write_table(path, R::HEADERS, &rows).await
}
