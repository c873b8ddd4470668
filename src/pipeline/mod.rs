// src/pipeline/mod.rs

//! Pipeline entry points for crawler operations.
//!
//! - `run_catalog`: Crawl the paginated catalog and download each entry's document
//! - `run_sections`: Crawl section × month listings and render each item
//! - `run_validate`: Check the configuration without crawling

pub mod catalog;
pub mod sections;
pub mod validate;

pub use catalog::{crawl_catalog, run_catalog};
pub use sections::{crawl_sections, run_sections};
pub use validate::run_validate;

use crate::models::RunResult;
use crate::utils;

/// Log the end-of-run summary block.
fn log_run_summary<R>(title: &str, result: &RunResult<R>) {
    utils::log::summary(
        title,
        &[
            ("Scopes", result.scopes.len().to_string()),
            ("Pages", result.pages().to_string()),
            ("Records", result.records.len().to_string()),
            ("Rows attempted", result.rows_attempted.to_string()),
            ("Artifacts fetched", result.artifacts_fetched.to_string()),
            ("Artifacts missing", result.artifacts_missing().to_string()),
        ],
    );
    for scope in &result.scopes {
        let reported = scope
            .reported_total
            .map(|n| format!(", {n} reported"))
            .unwrap_or_default();
        utils::log::sub_item(&format!(
            "{}: {} page(s), {} record(s){reported} ({})",
            scope.scope, scope.pages, scope.records, scope.stop
        ));
    }
}
