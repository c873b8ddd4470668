// src/models/item.rs

//! Render-variant item record.

use serde::{Deserialize, Serialize};

use super::TableRow;

/// Metadata kept for one captured item of a section listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemRecord {
    pub section: String,
    pub title: String,
    pub date: String,

    /// Rendered artifact path, empty when capture or rendering failed
    pub pdf_path: String,
}

impl ItemRecord {
    pub fn has_artifact(&self) -> bool {
        !self.pdf_path.is_empty()
    }
}

impl TableRow for ItemRecord {
    const HEADERS: &'static [&'static str] = &["section", "title", "date", "pdf_path"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.section.clone(),
            self.title.clone(),
            self.date.clone(),
            self.pdf_path.clone(),
        ]
    }
}
