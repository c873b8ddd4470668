// src/services/mod.rs

//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Row extraction and key derivation (`RecordExtractor`)
//! - Artifact location and retrieval (`ArtifactResolver`, `ArtifactFetcher`)
//! - Per-page harvesting (`PageHarvester`, `ItemHarvester`)
//! - Pagination (`PaginationTraverser`) and section × month scopes (`CategoryIterator`)
//! - Run-level accumulation (`ResultAggregator`)

mod aggregator;
mod categories;
mod extractor;
mod fetcher;
pub mod harvester;
pub mod items;
mod render;
mod resolver;
pub mod traverser;

pub use aggregator::ResultAggregator;
pub use categories::{CategoryIterator, months_through, section_scopes};
pub use extractor::{DerivedKey, Extraction, RecordExtractor};
pub use fetcher::{ArtifactFetcher, FetchedArtifact};
pub use harvester::{Harvester, PageHarvest, PageHarvester};
pub use items::ItemHarvester;
pub use render::{DocumentRenderer, HtmlRenderer, PdfRenderer, renderer_for};
pub use resolver::{ArtifactLocation, ArtifactResolver, MarkupDocument};
pub use traverser::PaginationTraverser;
