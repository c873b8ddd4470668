// src/pipeline/sections.rs

//! Section listing pipeline (render variant).

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Config, ItemRecord, RunResult};
use crate::navigation::Navigator;
use crate::services::{ArtifactFetcher, ArtifactResolver, CategoryIterator, section_scopes};
use crate::storage::{self, ResultStorage};
use crate::utils;

/// Crawl every section for each month of `today`'s year up to `today`.
pub async fn crawl_sections(
    config: &Config,
    navigator: &mut dyn Navigator,
    fetcher: &ArtifactFetcher,
    today: NaiveDate,
) -> RunResult<ItemRecord> {
    let layout = &config.sections;
    let scopes = section_scopes(&layout.sections, today);
    log::info!(
        "{} section(s), {} scope(s) through {today}",
        layout.sections.len(),
        scopes.len()
    );

    let resolver = ArtifactResolver::new(&config.catalog.document_url_template);
    CategoryIterator::new(layout, &resolver, fetcher)
        .run(navigator, today)
        .await
}

/// Crawl the sections, then write the item table and its JSON sidecar.
pub async fn run_sections(
    config: &Config,
    navigator: &mut dyn Navigator,
    fetcher: &ArtifactFetcher,
    storage: &dyn ResultStorage,
    today: NaiveDate,
) -> Result<RunResult<ItemRecord>> {
    utils::log::header("Section crawl starting");
    let result = crawl_sections(config, navigator, fetcher, today).await;
    super::log_run_summary("Section crawl", &result);

    let table = storage::save_records(storage, &config.paths.items_csv, &result.records).await?;
    let metadata = storage
        .write_metadata(&config.paths.metadata_json, &result.records)
        .await?;
    log::info!(
        "Saved {} item(s) to {} and {}",
        table.count,
        table.location,
        metadata.location
    );
    Ok(result)
}
