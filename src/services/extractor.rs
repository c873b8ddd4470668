// src/services/extractor.rs

//! Listing row to [`ListingRecord`].

use crate::error::{AppError, Result};
use crate::models::ListingRecord;
use crate::utils::last_segment;

/// Key an artifact location is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKey {
    pub year: String,
    pub document_id: String,
}

/// Outcome of extracting one row. The record is always present.
#[derive(Debug)]
pub struct Extraction {
    pub record: ListingRecord,
    pub key: Result<DerivedKey>,
}

/// Turns the cell texts of one result row into a record.
///
/// The last cell is display-only size metadata and is dropped. The date and
/// catalog id are the 3rd- and 2nd-from-last cells of the full row.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordExtractor;

impl RecordExtractor {
    pub fn new() -> Self {
        Self
    }

    /// `row` is the 1-based position on the page, used in errors only.
    pub fn extract(&self, row: usize, cells: &[String], ref_type: &str) -> Extraction {
        let cells: Vec<String> = cells.iter().map(|c| c.trim().to_string()).collect();
        let informational = &cells[..cells.len().saturating_sub(1)];
        let mut record = ListingRecord::from_cells(informational, ref_type);

        let key = Self::derive_key(row, &cells);
        if let Ok(key) = &key {
            record.derived_id = key.document_id.clone();
        }
        Extraction { record, key }
    }

    fn derive_key(row: usize, cells: &[String]) -> Result<DerivedKey> {
        if cells.len() < 3 {
            return Err(AppError::row(
                row,
                format!("expected at least 3 columns, found {}", cells.len()),
            ));
        }
        let date = &cells[cells.len() - 3];
        let catalog_id = &cells[cells.len() - 2];

        let year = last_segment(date, '-');
        if year.is_empty() {
            return Err(AppError::row(row, format!("no year in date '{date}'")));
        }
        let document_id = last_segment(catalog_id, '-');
        if document_id.is_empty() {
            return Err(AppError::row(
                row,
                format!("no document id in '{catalog_id}'"),
            ));
        }
        Ok(DerivedKey {
            year: year.to_string(),
            document_id: document_id.to_string(),
        })
    }
}
