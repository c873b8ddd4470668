// src/services/harvester.rs

//! Per-page harvesting of catalog result rows.

use async_trait::async_trait;
use scraper::ElementRef;

use crate::error::{AppError, Result};
use crate::models::{CatalogConfig, ListingRecord};
use crate::navigation::Navigator;
use crate::navigation::inspect::{self, PageView};

use super::extractor::{Extraction, RecordExtractor};
use super::fetcher::ArtifactFetcher;
use super::resolver::ArtifactResolver;

/// What one page contributed.
#[derive(Debug)]
pub struct PageHarvest<R> {
    pub records: Vec<R>,
    pub attempted: usize,
    pub fetched: usize,
}

impl<R> Default for PageHarvest<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            attempted: 0,
            fetched: 0,
        }
    }
}

/// Turns the page a traversal is on into records.
///
/// Implementations isolate failures per row: every attempted row yields a
/// record, whether or not its artifact could be produced.
#[async_trait]
pub trait Harvester: Send {
    type Record: Send;

    /// `page` is the 1-based index of the page within its scope.
    async fn harvest(
        &mut self,
        navigator: &mut dyn Navigator,
        source: &str,
        page: usize,
    ) -> PageHarvest<Self::Record>;
}

/// Harvests catalog result tables and downloads each row's document.
pub struct PageHarvester<'a> {
    extractor: RecordExtractor,
    resolver: &'a ArtifactResolver,
    fetcher: &'a ArtifactFetcher,
    layout: &'a CatalogConfig,
    ref_type: String,
}

impl<'a> PageHarvester<'a> {
    pub fn new(
        resolver: &'a ArtifactResolver,
        fetcher: &'a ArtifactFetcher,
        layout: &'a CatalogConfig,
        ref_type: impl Into<String>,
    ) -> Self {
        Self {
            extractor: RecordExtractor::new(),
            resolver,
            fetcher,
            layout,
            ref_type: ref_type.into(),
        }
    }
}

#[async_trait]
impl Harvester for PageHarvester<'_> {
    type Record = ListingRecord;

    async fn harvest(
        &mut self,
        _navigator: &mut dyn Navigator,
        source: &str,
        page: usize,
    ) -> PageHarvest<ListingRecord> {
        let scope = &self.ref_type;
        let rows = match result_rows(source, self.layout) {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("[{scope}] page {page}: {e}");
                return PageHarvest::default();
            }
        };
        log::info!("[{scope}] page {page}: {} row(s)", rows.len());

        let mut harvest = PageHarvest::default();
        for (i, cells) in rows.iter().enumerate() {
            let row = i + 1;
            harvest.attempted += 1;
            let Extraction { mut record, key } = self.extractor.extract(row, cells, scope);

            match key {
                Ok(key) => {
                    let location = self.resolver.locate(&key);
                    match self.fetcher.fetch(&location, &key.document_id).await {
                        Ok(artifact) => {
                            log::info!("[{scope}] page {page} row {row}: saved {}", artifact.path.display());
                            record.artifact_path = artifact.path_string();
                            harvest.fetched += 1;
                        }
                        Err(e) => log::warn!(
                            "[{scope}] page {page} row {row}: document {} not fetched ({}): {e}",
                            key.document_id,
                            e.kind()
                        ),
                    }
                }
                Err(e) => log::warn!("[{scope}] page {page}: {e}"),
            }
            harvest.records.push(record);
        }
        harvest
    }
}

/// Cell texts of the data rows on a result page.
///
/// Structure contract: the outer results table, then the configured fixed
/// descent to the data table, whose first row is a header. Pager rows and
/// rows of nested tables are not data rows. At most `page_size` rows after
/// the header are returned.
pub fn result_rows(source: &str, layout: &CatalogConfig) -> Result<Vec<Vec<String>>> {
    let view = PageView::parse(source);
    let outer = view.locate(&layout.results_selector)?.ok_or_else(|| {
        AppError::navigation(format!("'{}' not on page", layout.results_selector))
    })?;
    let table = inspect::descend(outer, &layout.table_path)?
        .ok_or_else(|| AppError::navigation("data table not found under results table"))?;
    let pager = inspect::parse_selector(&layout.pager.row)?;

    inspect::locate_all_in(table, "tr")?
        .into_iter()
        .filter(|tr| !pager.matches(tr) && owning_table(*tr) == Some(table))
        .skip(1)
        .take(layout.page_size)
        .map(|tr| {
            Ok(inspect::locate_all_in(tr, "td")?
                .into_iter()
                .map(inspect::text)
                .collect())
        })
        .collect()
}

fn owning_table(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::navigation::scripted::ScriptedNavigator;

    /// A catalog result page in the shape the default layout expects.
    pub(crate) fn catalog_page(label: &str, links: &[&str], rows: &[Vec<&str>]) -> String {
        let body: String = rows
            .iter()
            .map(|cells| {
                let tds: String = cells.iter().map(|c| format!("<td>{c}</td>")).collect();
                format!("<tr>{tds}</tr>")
            })
            .collect();
        let mut pager = format!("<td><span>{label}</span></td>");
        for link in links {
            pager.push_str(&format!("<td><a href=\"page-{link}\">{link}</a></td>"));
        }
        format!(
            r#"<html><body>
            <span id="lbl_Result">Total Gazettes : 42</span>
            <table id="tbl_Gazette">
              <tr><td>Search results</td></tr>
              <tr><td><div><table class="grid">
                <tr><th>S. No.</th><th>Subject</th></tr>
                {body}
                <tr class="pager"><td colspan="11"><table><tr>{pager}</tr></table></td></tr>
              </table></div></td></tr>
            </table>
            </body></html>"#
        )
    }

    pub(crate) fn gazette_row(n: usize, id: &str) -> Vec<String> {
        vec![
            n.to_string(),
            "Ministry of Law and Justice".into(),
            "Legislative Department".into(),
            "".into(),
            format!("Subject {n}"),
            "Act".into(),
            "Part II-Section 1".into(),
            "05-Apr-2025".into(),
            "16-Apr-2025".into(),
            format!("CG-DL-E-16042025-{id}"),
            "1 MB".into(),
        ]
    }

    #[test]
    fn extracts_data_rows_under_header() {
        let rows = vec![vec!["1", "a", "16-Apr-2025", "CG-1", "1 MB"]];
        let source = catalog_page("1", &["2"], &rows);
        let out = result_rows(&source, &CatalogConfig::default()).unwrap();
        assert_eq!(out[0], ["1", "a", "16-Apr-2025", "CG-1", "1 MB"]);
    }

    #[test]
    fn caps_rows_at_page_size() {
        let rows: Vec<Vec<&str>> = (0..20).map(|_| vec!["x", "y", "z"]).collect();
        let source = catalog_page("1", &[], &rows);
        let layout = CatalogConfig::default();
        let out = result_rows(&source, &layout).unwrap();
        assert_eq!(out.len(), layout.page_size);
    }

    #[test]
    fn short_page_excludes_pager_rows() {
        let rows = vec![vec!["1", "a", "b"], vec!["2", "c", "d"]];
        let source = catalog_page("3", &["1", "2"], &rows);
        let out = result_rows(&source, &CatalogConfig::default()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1][0], "2");
    }

    #[tokio::test]
    async fn unreachable_document_server_keeps_the_record() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = CatalogConfig::default();
        // Nothing listens on the discard port, so every download fails to connect.
        let resolver = ArtifactResolver::new("http://127.0.0.1:9/{year}/{id}.pdf");
        let fetcher = ArtifactFetcher::new(
            reqwest::Client::new(),
            dir.path(),
            dir.path(),
            Box::new(crate::services::render::HtmlRenderer),
        );
        let row = gazette_row(1, "262469");
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        let source = catalog_page("1", &[], &[cells]);
        let mut nav = ScriptedNavigator::new(Vec::<(String, String)>::new());

        let mut harvester = PageHarvester::new(&resolver, &fetcher, &layout, "Act");
        let harvest = harvester.harvest(&mut nav, &source, 1).await;

        assert_eq!(harvest.attempted, 1);
        assert_eq!(harvest.fetched, 0);
        let expected = ListingRecord {
            derived_id: "262469".into(),
            ..ListingRecord::from_cells(&row[..row.len() - 1], "Act")
        };
        assert_eq!(harvest.records, [expected]);
        assert_eq!(harvest.records[0].artifact_path, "");
        assert_eq!(harvest.records[0].gazette_id, "CG-DL-E-16042025-262469");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_results_table_is_an_error() {
        let err = result_rows("<html></html>", &CatalogConfig::default()).unwrap_err();
        assert!(err.to_string().contains("#tbl_Gazette"));
    }
}
