// src/models/record.rs

//! Catalog listing record.

use serde::{Deserialize, Serialize};

/// Something that can be written as one row of a flat output table.
pub trait TableRow {
    /// Column header, in field order.
    const HEADERS: &'static [&'static str];

    /// Cell values, in the same order as [`Self::HEADERS`].
    fn cells(&self) -> Vec<String>;
}

/// One row of the catalog, plus what was derived from it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingRecord {
    pub serial_no: String,
    pub organization: String,
    pub department: String,
    pub office: String,
    pub subject: String,
    pub category: String,
    pub part_section: String,
    pub issue_date: String,
    pub publish_date: String,
    pub gazette_id: String,

    /// Numeric document id taken from the catalog id column
    pub derived_id: String,

    /// Local artifact path, empty until the artifact is fetched
    pub artifact_path: String,

    /// Reference type (traversal scope) the record came from
    pub ref_type: String,
}

impl ListingRecord {
    /// Build a record from informational cells, assigned by position.
    ///
    /// Missing trailing cells stay empty; cells past the known fields are ignored.
    pub fn from_cells(cells: &[String], ref_type: &str) -> Self {
        let mut it = cells.iter().cloned();
        let mut next = || it.next().unwrap_or_default();
        Self {
            serial_no: next(),
            organization: next(),
            department: next(),
            office: next(),
            subject: next(),
            category: next(),
            part_section: next(),
            issue_date: next(),
            publish_date: next(),
            gazette_id: next(),
            derived_id: String::new(),
            artifact_path: String::new(),
            ref_type: ref_type.to_string(),
        }
    }

    pub fn has_artifact(&self) -> bool {
        !self.artifact_path.is_empty()
    }
}

impl TableRow for ListingRecord {
    const HEADERS: &'static [&'static str] = &[
        "S. No.",
        "Ministry / Organization",
        "Department",
        "Office",
        "Subject",
        "Category",
        "Part & Section",
        "Issue Date",
        "Publish Date",
        "Gazette ID",
        "Document_id",
        "pdf_path",
        "Ref Type",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.serial_no.clone(),
            self.organization.clone(),
            self.department.clone(),
            self.office.clone(),
            self.subject.clone(),
            self.category.clone(),
            self.part_section.clone(),
            self.issue_date.clone(),
            self.publish_date.clone(),
            self.gazette_id.clone(),
            self.derived_id.clone(),
            self.artifact_path.clone(),
            self.ref_type.clone(),
        ]
    }
}
