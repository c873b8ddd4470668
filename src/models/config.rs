// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and waiting behavior
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Paginated catalog (download variant)
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Section × month listing (render variant)
    #[serde(default)]
    pub sections: SectionsConfig,

    /// Output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.wait_timeout_secs == 0 {
            return Err(AppError::validation(
                "crawler.wait_timeout_secs must be > 0",
            ));
        }
        if self.catalog.page_size == 0 {
            return Err(AppError::validation("catalog.page_size must be > 0"));
        }
        let template = &self.catalog.document_url_template;
        if !template.contains("{year}") || !template.contains("{id}") {
            return Err(AppError::validation(
                "catalog.document_url_template must contain {year} and {id}",
            ));
        }
        if self.catalog.ref_types.is_empty() {
            return Err(AppError::validation("No catalog reference types defined"));
        }
        if self.catalog.page_limit == Some(0) || self.sections.page_limit == Some(0) {
            return Err(AppError::validation("page_limit must be > 0 when set"));
        }
        if self.sections.sections.is_empty() {
            return Err(AppError::validation("No sections defined"));
        }
        let names = &self.sections.sections;
        if let Some(dup) = names
            .iter()
            .enumerate()
            .find(|(i, e)| names[..*i].iter().any(|p| p.name == e.name))
        {
            return Err(AppError::validation(format!(
                "Section '{}' is defined more than once",
                dup.1.name
            )));
        }
        if self.sections.title_max_len == 0 {
            return Err(AppError::validation("sections.title_max_len must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client and waiting behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds (applies to artifact downloads)
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Upper bound for any wait on a navigation result or page element
    #[serde(default = "defaults::wait_timeout")]
    pub wait_timeout_secs: u64,

    /// Interval between re-checks while waiting for an element
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_ms: u64,

    /// Delay after activating a pager link, in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            wait_timeout_secs: defaults::wait_timeout(),
            poll_interval_ms: defaults::poll_interval(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// One step of a fixed structural descent: the `index`-th descendant
/// matching `selector`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DescentStep {
    pub selector: String,
    #[serde(default)]
    pub index: usize,
}

impl DescentStep {
    pub fn new(selector: impl Into<String>, index: usize) -> Self {
        Self {
            selector: selector.into(),
            index,
        }
    }
}

/// Pager location shared by both variants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PagerSelectors {
    /// Selector for the pager row
    pub row: String,

    /// Selector for the page cells inside the pager row
    pub cell: String,
}

impl Default for PagerSelectors {
    fn default() -> Self {
        Self {
            row: "tr.pager".to_string(),
            cell: "td > table > tbody > tr > td".to_string(),
        }
    }
}

/// Paginated catalog settings (download variant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Page that exposes the search form / first result page
    #[serde(default = "defaults::search_url")]
    pub search_url: String,

    /// Drop-down selecting the reference type
    #[serde(default = "defaults::ref_type_control")]
    pub ref_type_control: String,

    /// Button submitting the search form after the reference type is chosen
    /// (unset = results load on selection)
    #[serde(default = "defaults::submit_control")]
    pub submit_control: Option<String>,

    /// Reference types to crawl, one traversal scope each
    #[serde(default = "defaults::ref_types")]
    pub ref_types: Vec<String>,

    /// Label carrying the total result count
    #[serde(default = "defaults::result_count_selector")]
    pub result_count_selector: String,

    /// Outer results table whose presence marks a loaded result page
    #[serde(default = "defaults::results_selector")]
    pub results_selector: String,

    /// Descent from the outer results table to the data table
    #[serde(default = "defaults::table_path")]
    pub table_path: Vec<DescentStep>,

    /// Data rows per result page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    #[serde(default)]
    pub pager: PagerSelectors,

    /// Stop after this many pages per scope (unset = unbounded)
    #[serde(default)]
    pub page_limit: Option<usize>,

    /// Artifact URL template with `{year}` and `{id}` placeholders
    #[serde(default = "defaults::document_url_template")]
    pub document_url_template: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            search_url: defaults::search_url(),
            ref_type_control: defaults::ref_type_control(),
            submit_control: defaults::submit_control(),
            ref_types: defaults::ref_types(),
            result_count_selector: defaults::result_count_selector(),
            results_selector: defaults::results_selector(),
            table_path: defaults::table_path(),
            page_size: defaults::page_size(),
            pager: PagerSelectors::default(),
            page_limit: None,
            document_url_template: defaults::document_url_template(),
        }
    }
}

/// A named section of the categorized listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionEntry {
    /// Name recorded on every item of this section
    pub name: String,

    /// Selector of the control that opens the section from the root page
    pub link_selector: String,
}

impl SectionEntry {
    fn titled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            link_selector: format!("div.pm-section a[title='{name}']"),
        }
    }
}

/// Section × month listing settings (render variant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsConfig {
    #[serde(default = "defaults::sections_root")]
    pub root_url: String,

    #[serde(default = "defaults::sections")]
    pub sections: Vec<SectionEntry>,

    #[serde(default = "defaults::year_control")]
    pub year_control: String,

    #[serde(default = "defaults::month_control")]
    pub month_control: String,

    /// Selector whose presence marks a loaded listing page
    #[serde(default = "defaults::listing_selector")]
    pub listing_selector: String,

    /// Selector for each listed item
    #[serde(default = "defaults::item_selector")]
    pub item_selector: String,

    /// Selector whose presence marks a loaded item page
    #[serde(default = "defaults::content_selector")]
    pub content_selector: String,

    /// Frame holding the content, followed when present
    #[serde(default = "defaults::content_frame_selector")]
    pub content_frame_selector: Option<String>,

    /// Element whose `value` (or text) is the item title
    #[serde(default = "defaults::title_selector")]
    pub title_selector: String,

    /// Element whose `value` (or inner HTML) is the item body
    #[serde(default = "defaults::body_selector")]
    pub body_selector: String,

    /// Maximum length of the sanitized title in rendered file names
    #[serde(default = "defaults::title_max_len")]
    pub title_max_len: usize,

    /// Output format of rendered items
    #[serde(default)]
    pub render_format: RenderFormat,

    #[serde(default)]
    pub pager: PagerSelectors,

    #[serde(default)]
    pub page_limit: Option<usize>,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            root_url: defaults::sections_root(),
            sections: defaults::sections(),
            year_control: defaults::year_control(),
            month_control: defaults::month_control(),
            listing_selector: defaults::listing_selector(),
            item_selector: defaults::item_selector(),
            content_selector: defaults::content_selector(),
            content_frame_selector: defaults::content_frame_selector(),
            title_selector: defaults::title_selector(),
            body_selector: defaults::body_selector(),
            title_max_len: defaults::title_max_len(),
            render_format: RenderFormat::default(),
            pager: PagerSelectors::default(),
            page_limit: None,
        }
    }
}

/// Artifact format for rendered items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Pdf,
    Html,
}

impl FromStr for RenderFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "html" => Ok(Self::Html),
            other => Err(AppError::config(format!(
                "unknown render format {other:?} (expected pdf or html)"
            ))),
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Catalog records table
    #[serde(default = "defaults::output_csv")]
    pub output_csv: PathBuf,

    /// Render-variant item table
    #[serde(default = "defaults::items_csv")]
    pub items_csv: PathBuf,

    /// Render-variant JSON sidecar
    #[serde(default = "defaults::metadata_json")]
    pub metadata_json: PathBuf,

    /// Downloaded catalog artifacts
    #[serde(default = "defaults::download_dir")]
    pub download_dir: PathBuf,

    /// Rendered item artifacts
    #[serde(default = "defaults::render_dir")]
    pub render_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_csv: defaults::output_csv(),
            items_csv: defaults::items_csv(),
            metadata_json: defaults::metadata_json(),
            download_dir: defaults::download_dir(),
            render_dir: defaults::render_dir(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::{DescentStep, SectionEntry};

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; gazette-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn wait_timeout() -> u64 {
        10
    }
    pub fn poll_interval() -> u64 {
        500
    }
    pub fn request_delay() -> u64 {
        2000
    }

    // Catalog defaults
    pub fn search_url() -> String {
        "https://egazette.gov.in/SearchMenu.aspx".into()
    }
    pub fn ref_type_control() -> String {
        "ddlreftype".into()
    }
    pub fn submit_control() -> Option<String> {
        Some("ImgSubmitDetails".into())
    }
    pub fn ref_types() -> Vec<String> {
        vec!["Act".into(), "Bill".into(), "Assent".into()]
    }
    pub fn result_count_selector() -> String {
        "#lbl_Result".into()
    }
    pub fn results_selector() -> String {
        "#tbl_Gazette".into()
    }
    pub fn table_path() -> Vec<DescentStep> {
        vec![
            DescentStep::new("tr", 1),
            DescentStep::new("td", 0),
            DescentStep::new("div", 0),
            DescentStep::new("table", 0),
        ]
    }
    pub fn page_size() -> usize {
        15
    }
    pub fn document_url_template() -> String {
        "https://egazette.gov.in/WriteReadData/{year}/{id}.pdf".into()
    }

    // Sections defaults
    pub fn sections_root() -> String {
        "https://pib.gov.in/".into()
    }
    pub fn sections() -> Vec<SectionEntry> {
        vec![
            SectionEntry::titled("Speeches"),
            SectionEntry::titled("Press Releases"),
        ]
    }
    pub fn year_control() -> String {
        "ContentPlaceHolder1_ddlYear".into()
    }
    pub fn month_control() -> String {
        "ContentPlaceHolder1_ddlMonth".into()
    }
    pub fn listing_selector() -> String {
        "div.content-area".into()
    }
    pub fn item_selector() -> String {
        "div.content-area ul.num > li".into()
    }
    pub fn content_selector() -> String {
        "form#form1".into()
    }
    pub fn content_frame_selector() -> Option<String> {
        Some("#ContentPlaceHolder1_iframepressrealese".into())
    }
    pub fn title_selector() -> String {
        "#ltrTitlee".into()
    }
    pub fn body_selector() -> String {
        "#ltrDescriptionn".into()
    }
    pub fn title_max_len() -> usize {
        50
    }

    // Path defaults
    pub fn output_csv() -> PathBuf {
        "gazette_records.csv".into()
    }
    pub fn items_csv() -> PathBuf {
        "extracted_results.csv".into()
    }
    pub fn metadata_json() -> PathBuf {
        "extracted_results.json".into()
    }
    pub fn download_dir() -> PathBuf {
        "downloads".into()
    }
    pub fn render_dir() -> PathBuf {
        "speeches_pdf/html_to_pdf".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
