// src/pipeline/catalog.rs

//! Catalog crawling pipeline (download variant).

use crate::error::Result;
use crate::models::{CatalogConfig, Config, ListingRecord, RunResult, ScopeOutcome, StopReason};
use crate::navigation::inspect::{self, PageView};
use crate::navigation::{Navigator, PageTarget};
use crate::services::{
    ArtifactFetcher, ArtifactResolver, PageHarvester, PaginationTraverser, ResultAggregator,
};
use crate::storage::{self, ResultStorage};
use crate::utils;

/// First integer in the result-count label, if the label is there.
pub fn reported_total(source: &str, selector: &str) -> Result<Option<u64>> {
    let view = PageView::parse(source);
    Ok(view
        .locate(selector)?
        .and_then(|label| utils::first_number(&inspect::text(label))))
}

/// Open the search page, pick the reference type, submit and wait for results.
async fn open_search(
    catalog: &CatalogConfig,
    navigator: &mut dyn Navigator,
    ref_type: &str,
) -> Result<Option<u64>> {
    navigator
        .reach_page(&PageTarget::new(&catalog.search_url))
        .await?;
    navigator
        .wait_for(&format!("#{}", catalog.ref_type_control))
        .await?;
    navigator
        .select_option(&catalog.ref_type_control, ref_type)
        .await?;
    if let Some(submit) = &catalog.submit_control {
        navigator.wait_for(&format!("#{submit}")).await?;
        navigator.submit(submit).await?;
    }
    let source = navigator.wait_for(&catalog.results_selector).await?;
    reported_total(&source, &catalog.result_count_selector)
}

async fn crawl_ref_type(
    catalog: &CatalogConfig,
    navigator: &mut dyn Navigator,
    resolver: &ArtifactResolver,
    fetcher: &ArtifactFetcher,
    ref_type: &str,
) -> ScopeOutcome<ListingRecord> {
    let reported = match open_search(catalog, navigator, ref_type).await {
        Ok(reported) => reported,
        Err(e) => {
            log::error!("[{ref_type}] search could not be opened: {e}");
            return ScopeOutcome::new(ref_type, StopReason::aborted(&e));
        }
    };
    match reported {
        Some(total) => log::info!("[{ref_type}] {total} entries reported"),
        None => log::warn!("[{ref_type}] result count not readable"),
    }

    let mut harvester = PageHarvester::new(resolver, fetcher, catalog, ref_type);
    let mut outcome = PaginationTraverser::new(
        &catalog.results_selector,
        &catalog.pager,
        catalog.page_limit,
    )
    .traverse(ref_type, navigator, &mut harvester)
    .await;
    outcome.reported_total = reported;
    outcome
}

/// Crawl every configured reference type, one scope each.
pub async fn crawl_catalog(
    config: &Config,
    navigator: &mut dyn Navigator,
    fetcher: &ArtifactFetcher,
) -> RunResult<ListingRecord> {
    let catalog = &config.catalog;
    let resolver = ArtifactResolver::new(&catalog.document_url_template);
    let mut aggregator = ResultAggregator::new();

    let total = catalog.ref_types.len();
    for (i, ref_type) in catalog.ref_types.iter().enumerate() {
        utils::log::step(i + 1, total, &format!("Reference type '{ref_type}'"));
        let outcome = crawl_ref_type(catalog, navigator, &resolver, fetcher, ref_type).await;
        aggregator.absorb(outcome);
    }
    aggregator.finish()
}

/// Crawl the catalog, then write the record table.
///
/// Only the final write can fail the run.
pub async fn run_catalog(
    config: &Config,
    navigator: &mut dyn Navigator,
    fetcher: &ArtifactFetcher,
    storage: &dyn ResultStorage,
) -> Result<RunResult<ListingRecord>> {
    utils::log::header("Catalog crawl starting");
    let result = crawl_catalog(config, navigator, fetcher).await;
    super::log_run_summary("Catalog crawl", &result);

    let summary = storage::save_records(storage, &config.paths.output_csv, &result.records).await?;
    log::info!("Saved {} record(s) to {}", summary.count, summary.location);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::models::TableRow;
    use crate::navigation::scripted::ScriptedNavigator;
    use crate::services::HtmlRenderer;
    use crate::services::harvester::tests::{catalog_page, gazette_row};
    use crate::storage::LocalStorage;

    const SEARCH: &str = "https://catalog.example/SearchMenu.aspx";

    fn search_page() -> String {
        "<html><body><form><select id=\"ddlreftype\" name=\"ref\">\
         <option value=\"1\">Act</option></select>\
         <input type=\"image\" id=\"ImgSubmitDetails\" name=\"ImgSubmitDetails\">\
         </form></body></html>"
            .to_string()
    }

    fn page(label: &str, links: &[&str], rows: &[Vec<String>]) -> String {
        let rows: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| r.iter().map(String::as_str).collect())
            .collect();
        catalog_page(label, links, &rows)
    }

    #[test]
    fn reads_reported_total() {
        let source = catalog_page("1", &[], &[]);
        assert_eq!(reported_total(&source, "#lbl_Result").unwrap(), Some(42));
        assert_eq!(reported_total(&source, "#missing").unwrap(), None);
    }

    #[tokio::test]
    async fn two_page_catalog_end_to_end() {
        let server = MockServer::start().await;
        for id in ["1001", "1002", "2001"] {
            Mock::given(method("GET"))
                .and(path(format!("/WriteReadData/2025/{id}.pdf")))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(format!("%PDF {id}")))
                .mount(&server)
                .await;
        }
        // 2002 is not mounted and answers 404.

        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.catalog.search_url = SEARCH.to_string();
        config.catalog.ref_types = vec!["Act".into()];
        config.catalog.document_url_template =
            format!("{}/WriteReadData/{{year}}/{{id}}.pdf", server.uri());
        config.paths.output_csv = dir.path().join("records.csv");

        let mut malformed = gazette_row(3, "x");
        malformed[9] = "CG-DL-E-".into();

        let mut nav = ScriptedNavigator::new([
            (SEARCH.to_string(), search_page()),
            (format!("{SEARCH}|ddlreftype=Act"), search_page()),
            (
                format!("{SEARCH}|ddlreftype=Act|submit=ImgSubmitDetails"),
                page(
                    "1",
                    &["2"],
                    &[gazette_row(1, "1001"), gazette_row(2, "1002"), malformed],
                ),
            ),
            (
                "page-2".to_string(),
                page("2", &["1"], &[gazette_row(4, "2001"), gazette_row(5, "2002")]),
            ),
        ]);

        let fetcher = ArtifactFetcher::new(
            reqwest::Client::new(),
            dir.path().join("downloads"),
            dir.path().join("rendered"),
            Box::new(HtmlRenderer),
        );
        let storage = LocalStorage::new(dir.path());

        let result = run_catalog(&config, &mut nav, &fetcher, &storage)
            .await
            .unwrap();

        assert_eq!(result.records.len(), 5);
        assert_eq!(result.rows_attempted, 5);
        assert_eq!(result.artifacts_fetched, 3);
        assert_eq!(result.pages(), 2);
        assert_eq!(result.scopes[0].reported_total, Some(42));
        assert_eq!(result.scopes[0].stop, StopReason::NoNextPage);

        let serials: Vec<_> = result.records.iter().map(|r| r.serial_no.as_str()).collect();
        assert_eq!(serials, ["1", "2", "3", "4", "5"]);
        assert_eq!(result.records[0].derived_id, "1001");
        assert!(result.records[0].artifact_path.ends_with("1001.pdf"));
        assert_eq!(result.records[2].derived_id, "");
        assert_eq!(result.records[2].artifact_path, "");
        assert_eq!(result.records[4].derived_id, "2002");
        assert_eq!(result.records[4].artifact_path, "");
        assert!(result.records.iter().all(|r| r.ref_type == "Act"));

        let saved = std::fs::read(dir.path().join("downloads/1001.pdf")).unwrap();
        assert_eq!(saved, b"%PDF 1001");

        let csv = std::fs::read_to_string(dir.path().join("records.csv")).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(ListingRecord::HEADERS.join(",").as_str()));
        assert_eq!(lines.count(), 5);
        assert_eq!(
            nav.trail[..3],
            [
                SEARCH.to_string(),
                format!("{SEARCH}|ddlreftype=Act"),
                format!("{SEARCH}|ddlreftype=Act|submit=ImgSubmitDetails"),
            ]
        );
    }

    #[tokio::test]
    async fn results_load_on_selection_without_submit_control() {
        let mut config = Config::default();
        config.catalog.search_url = SEARCH.to_string();
        config.catalog.submit_control = None;
        let mut nav = ScriptedNavigator::new([
            (SEARCH.to_string(), search_page()),
            (format!("{SEARCH}|ddlreftype=Bill"), page("1", &[], &[])),
        ]);

        let total = open_search(&config.catalog, &mut nav, "Bill").await.unwrap();

        assert_eq!(total, Some(42));
        assert!(nav.trail.iter().all(|k| !k.contains("submit=")));
    }

    #[tokio::test]
    async fn unreachable_search_still_writes_empty_table() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.catalog.search_url = SEARCH.to_string();
        config.paths.output_csv = dir.path().join("records.csv");
        let fetcher = ArtifactFetcher::new(
            reqwest::Client::new(),
            dir.path(),
            dir.path(),
            Box::new(HtmlRenderer),
        );
        let mut nav = ScriptedNavigator::new(Vec::<(String, String)>::new());

        let result = run_catalog(&config, &mut nav, &fetcher, &LocalStorage::new(dir.path()))
            .await
            .unwrap();

        assert!(result.records.is_empty());
        assert_eq!(result.scopes.len(), 3);
        assert!(result.scopes.iter().all(|s| s.stop.is_abort()));
        let csv = std::fs::read_to_string(dir.path().join("records.csv")).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
