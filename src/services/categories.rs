// src/services/categories.rs

//! Section × month scopes of the render variant.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::error::{AppError, Result};
use crate::models::{
    ItemRecord, RunResult, ScopeOutcome, SectionContext, SectionEntry, SectionsConfig, StopReason,
};
use crate::navigation::inspect::{self, PageView};
use crate::navigation::{Control, Navigator, PageTarget};

use super::aggregator::ResultAggregator;
use super::fetcher::ArtifactFetcher;
use super::items::ItemHarvester;
use super::resolver::ArtifactResolver;
use super::traverser::PaginationTraverser;

/// `(year, month)` from January through the month of `today`.
pub fn months_through(today: NaiveDate) -> impl Iterator<Item = (i32, u32)> {
    let year = today.year();
    (1..=today.month()).map(move |month| (year, month))
}

/// Every scope of a run, sections outermost.
pub fn section_scopes(sections: &[SectionEntry], today: NaiveDate) -> Vec<SectionContext> {
    sections
        .iter()
        .flat_map(|entry| {
            months_through(today).map(|(year, month)| SectionContext::new(&entry.name, year, month))
        })
        .collect()
}

fn section_link(source: &str, selector: &str) -> Result<Control> {
    let view = PageView::parse(source);
    let element = view
        .locate(selector)?
        .ok_or_else(|| AppError::navigation(format!("section link '{selector}' not found")))?;
    inspect::link_control(element)?
        .ok_or_else(|| AppError::navigation(format!("'{selector}' is not a link")))
}

/// Runs one fresh traversal per `{section, year, month}`.
pub struct CategoryIterator<'a> {
    layout: &'a SectionsConfig,
    resolver: &'a ArtifactResolver,
    fetcher: &'a ArtifactFetcher,
    clock: Option<fn() -> NaiveDateTime>,
}

impl<'a> CategoryIterator<'a> {
    pub fn new(
        layout: &'a SectionsConfig,
        resolver: &'a ArtifactResolver,
        fetcher: &'a ArtifactFetcher,
    ) -> Self {
        Self {
            layout,
            resolver,
            fetcher,
            clock: None,
        }
    }

    /// Replace the timestamp source used for rendered file names.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Visit every section and month up to `today`. A scope that fails is
    /// logged and recorded as aborted; the next scope still runs.
    pub async fn run(&self, navigator: &mut dyn Navigator, today: NaiveDate) -> RunResult<ItemRecord> {
        let mut aggregator = ResultAggregator::new();
        for context in section_scopes(&self.layout.sections, today) {
            let Some(entry) = self
                .layout
                .sections
                .iter()
                .find(|e| e.name == context.section)
            else {
                continue;
            };
            let outcome = self.run_scope(navigator, entry, &context).await;
            aggregator.absorb(outcome);
        }
        aggregator.finish()
    }

    async fn run_scope(
        &self,
        navigator: &mut dyn Navigator,
        entry: &SectionEntry,
        context: &SectionContext,
    ) -> ScopeOutcome<ItemRecord> {
        let scope = context.to_string();
        log::info!("[{scope}] opening {}", context.month_name());
        if let Err(e) = self.enter(navigator, entry, context).await {
            log::error!("[{scope}] could not reach listing: {e}");
            return ScopeOutcome::new(scope, StopReason::aborted(&e));
        }

        let mut harvester = ItemHarvester::new(self.resolver, self.fetcher, self.layout, &entry.name);
        if let Some(clock) = self.clock {
            harvester = harvester.with_clock(clock);
        }
        PaginationTraverser::new(
            &self.layout.listing_selector,
            &self.layout.pager,
            self.layout.page_limit,
        )
        .traverse(&scope, navigator, &mut harvester)
        .await
    }

    /// Root page, section link, then year and month drop-downs.
    async fn enter(
        &self,
        navigator: &mut dyn Navigator,
        entry: &SectionEntry,
        context: &SectionContext,
    ) -> Result<()> {
        navigator
            .reach_page(&PageTarget::new(&self.layout.root_url))
            .await?;
        let root = navigator.wait_for(&entry.link_selector).await?;
        let link = section_link(&root, &entry.link_selector)?;
        navigator.activate(&link).await?;

        navigator
            .wait_for(&format!("#{}", self.layout.year_control))
            .await?;
        navigator
            .select_option(&self.layout.year_control, &context.year.to_string())
            .await?;
        navigator
            .select_option(&self.layout.month_control, context.month_name())
            .await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::navigation::scripted::ScriptedNavigator;
    use crate::services::items::tests::{fixed_clock, item_frame, item_shell, listing_page};
    use crate::services::render::HtmlRenderer;

    const ROOT: &str = "https://pib.example/";

    fn root_page() -> String {
        "<html><body><div class=\"pm-section\">\
         <a title=\"Speeches\" href=\"speeches\">Speeches</a>\
         <a title=\"Press Releases\" href=\"releases\">Press Releases</a>\
         </div></body></html>"
            .to_string()
    }

    fn section_page() -> String {
        "<html><body><select id=\"ContentPlaceHolder1_ddlYear\"></select>\
         <select id=\"ContentPlaceHolder1_ddlMonth\"></select></body></html>"
            .to_string()
    }

    fn month_key(section: &str, month: &str) -> String {
        format!(
            "{section}|ContentPlaceHolder1_ddlYear=2025|ContentPlaceHolder1_ddlMonth={month}"
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn enumerates_months_up_to_today() {
        let months: Vec<_> = months_through(date(2025, 3, 14)).collect();
        assert_eq!(months, [(2025, 1), (2025, 2), (2025, 3)]);
        assert_eq!(months_through(date(2025, 1, 1)).count(), 1);
    }

    #[test]
    fn scopes_are_section_major() {
        let layout = SectionsConfig::default();
        let scopes = section_scopes(&layout.sections, date(2025, 2, 1));
        let names: Vec<_> = scopes.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            [
                "Speeches 2025-01",
                "Speeches 2025-02",
                "Press Releases 2025-01",
                "Press Releases 2025-02"
            ]
        );
    }

    #[tokio::test]
    async fn failed_scope_does_not_stop_the_run() {
        let dir = TempDir::new().unwrap();
        let mut layout = SectionsConfig::default();
        layout.root_url = ROOT.to_string();
        layout.sections.truncate(1);
        let resolver = ArtifactResolver::new("unused");
        let fetcher = ArtifactFetcher::new(
            reqwest::Client::new(),
            dir.path(),
            dir.path(),
            Box::new(HtmlRenderer),
        );

        // January lists one item, February's listing never loads, March is
        // empty; each month is its own scope.
        let mut nav = ScriptedNavigator::new([
            (ROOT.to_string(), root_page()),
            ("speeches".to_string(), section_page()),
            (
                month_key("speeches", "January"),
                listing_page("1", &[], &[("New year address", "01 JAN 2025", "item-1")]),
            ),
            (month_key("speeches", "March"), listing_page("1", &[], &[])),
            ("item-1".to_string(), item_shell("frame-1")),
            ("frame-1".to_string(), item_frame("New year address", "hello")),
        ]);

        let result = CategoryIterator::new(&layout, &resolver, &fetcher)
            .with_clock(fixed_clock)
            .run(&mut nav, date(2025, 3, 31))
            .await;

        assert_eq!(result.scopes.len(), 3);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].section, "Speeches");
        assert_eq!(result.records[0].date, "01 JAN 2025");
        assert!(result.records[0].has_artifact());
        assert_eq!(result.scopes[0].stop, StopReason::NoNextPage);
        assert!(result.scopes[1].stop.is_abort());
        assert_eq!(result.scopes[2].records, 0);
        assert_eq!(result.scopes[2].pages, 1);
    }

    #[tokio::test]
    async fn run_follows_section_scope_order() {
        let dir = TempDir::new().unwrap();
        let mut layout = SectionsConfig::default();
        layout.root_url = ROOT.to_string();
        let resolver = ArtifactResolver::new("unused");
        let fetcher = ArtifactFetcher::new(
            reqwest::Client::new(),
            dir.path(),
            dir.path(),
            Box::new(HtmlRenderer),
        );
        // Section pages are never served, so every scope aborts.
        let mut nav = ScriptedNavigator::new([(ROOT, root_page())]);
        let today = date(2025, 2, 20);

        let result = CategoryIterator::new(&layout, &resolver, &fetcher)
            .run(&mut nav, today)
            .await;

        let expected: Vec<_> = section_scopes(&layout.sections, today)
            .iter()
            .map(ToString::to_string)
            .collect();
        let visited: Vec<_> = result.scopes.iter().map(|s| s.scope.clone()).collect();
        assert_eq!(visited, expected);
        assert!(result.scopes.iter().all(|s| s.stop.is_abort()));
    }

    #[tokio::test]
    async fn missing_section_link_aborts_scope() {
        let dir = TempDir::new().unwrap();
        let mut layout = SectionsConfig::default();
        layout.root_url = ROOT.to_string();
        layout.sections = vec![SectionEntry {
            name: "Features".into(),
            link_selector: "div.pm-section a[title='Features']".into(),
        }];
        let resolver = ArtifactResolver::new("unused");
        let fetcher = ArtifactFetcher::new(
            reqwest::Client::new(),
            dir.path(),
            dir.path(),
            Box::new(HtmlRenderer),
        );
        let mut nav = ScriptedNavigator::new([(ROOT, root_page())]);

        let result = CategoryIterator::new(&layout, &resolver, &fetcher)
            .run(&mut nav, date(2025, 1, 10))
            .await;

        assert!(result.records.is_empty());
        assert_eq!(result.scopes.len(), 1);
        assert!(result.scopes[0].stop.is_abort());
    }
}
