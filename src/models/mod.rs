// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod item;
mod record;
mod traversal;

// Re-export all public types
pub use config::{
    CatalogConfig, Config, CrawlerConfig, DescentStep, LoggingConfig, PagerSelectors,
    PathsConfig, RenderFormat, SectionEntry, SectionsConfig,
};
pub use item::ItemRecord;
pub use record::{ListingRecord, TableRow};
pub use traversal::{
    RunResult, ScopeOutcome, ScopeSummary, SectionContext, StopReason, TraversalState,
};
