// src/services/traverser.rs

//! Pagination state machine.
//!
//! ```text
//! Fetching ──► Extracting ──► DeterminingNextPage ──► Paginating ──► Fetching
//!    │             │                  │
//!    └─────────────┴──────────────────┴──► Done
//! ```
//!
//! The current page label is checked against the visited set before the
//! page is harvested, so a pager that fails to advance never contributes
//! the same page twice.

use crate::error::Result;
use crate::models::{PagerSelectors, ScopeOutcome, StopReason, TraversalState};
use crate::navigation::inspect::{self, PageView};
use crate::navigation::{Control, Navigator};

use super::harvester::Harvester;

/// One cell of the pager row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerCell {
    pub text: String,
    pub link: Option<Control>,
}

/// Pager cells on a page; empty when the page has no pager.
pub fn pager_cells(source: &str, selectors: &PagerSelectors) -> Result<Vec<PagerCell>> {
    let view = PageView::parse(source);
    let Some(row) = view.locate(&selectors.row)? else {
        return Ok(Vec::new());
    };
    inspect::locate_all_in(row, &selectors.cell)?
        .into_iter()
        .map(|cell| {
            Ok(PagerCell {
                text: inspect::text(cell),
                link: inspect::link_control(cell)?,
            })
        })
        .collect()
}

/// The current page's label: the one cell without a link.
pub fn current_label(pager: &[PagerCell]) -> Option<&str> {
    pager
        .iter()
        .find(|c| c.link.is_none())
        .map(|c| c.text.as_str())
}

/// First link whose text has not been visited yet.
pub fn next_link<'p>(state: &TraversalState, pager: &'p [PagerCell]) -> Option<&'p Control> {
    pager
        .iter()
        .filter_map(|c| c.link.as_ref())
        .find(|link| !state.has_visited(&link.text))
}

/// Step decision taken once a page has been harvested.
pub fn decide_next(
    state: &TraversalState,
    pager: &[PagerCell],
    label: Option<&str>,
) -> std::result::Result<Control, StopReason> {
    if label.is_none() {
        return Err(if pager.is_empty() {
            StopReason::NoNextPage
        } else {
            StopReason::UnlabeledPage
        });
    }
    if let Some(limit) = state.limit().filter(|_| state.limit_reached()) {
        return Err(StopReason::LimitReached { limit });
    }
    next_link(state, pager)
        .cloned()
        .ok_or(StopReason::NoNextPage)
}

enum Phase {
    Fetching,
    Extracting(String),
    DeterminingNextPage {
        pager: Vec<PagerCell>,
        label: Option<String>,
    },
    Paginating(Control),
    Done(StopReason),
}

/// Walks the pages of one scope exactly once each.
#[derive(Debug, Clone)]
pub struct PaginationTraverser<'a> {
    ready_selector: &'a str,
    pager: &'a PagerSelectors,
    limit: Option<usize>,
}

impl<'a> PaginationTraverser<'a> {
    /// `ready_selector` marks a loaded listing page.
    pub fn new(ready_selector: &'a str, pager: &'a PagerSelectors, limit: Option<usize>) -> Self {
        Self {
            ready_selector,
            pager,
            limit,
        }
    }

    /// Run one scope to completion. Never fails: a navigation failure ends
    /// the scope with [`StopReason::Aborted`] and keeps what was collected.
    pub async fn traverse<H: Harvester>(
        &self,
        scope: &str,
        navigator: &mut dyn Navigator,
        harvester: &mut H,
    ) -> ScopeOutcome<H::Record> {
        let mut state = TraversalState::new(self.limit);
        let mut outcome = ScopeOutcome::new(scope, StopReason::NoNextPage);
        let mut phase = Phase::Fetching;

        let stop = loop {
            phase = match phase {
                Phase::Fetching => match navigator.wait_for(self.ready_selector).await {
                    Ok(source) => Phase::Extracting(source),
                    Err(e) => {
                        log::error!(
                            "[{scope}] listing not available after {} page(s): {e}",
                            state.pages_visited()
                        );
                        Phase::Done(StopReason::aborted(&e))
                    }
                },

                Phase::Extracting(source) => {
                    let pager = match pager_cells(&source, self.pager) {
                        Ok(pager) => pager,
                        Err(e) => {
                            log::error!("[{scope}] unreadable pager: {e}");
                            Vec::new()
                        }
                    };
                    let label = current_label(&pager).map(str::to_string);

                    let repeated = label
                        .as_deref()
                        .filter(|l| !state.mark_visited(l))
                        .map(str::to_string);

                    if let Some(label) = repeated {
                        log::warn!("[{scope}] page '{label}' already visited, stopping");
                        Phase::Done(StopReason::CycleDetected { label })
                    } else {
                        let page = state.pages_visited() + 1;
                        log::info!(
                            "[{scope}] harvesting page {page} (label {})",
                            label.as_deref().unwrap_or("-")
                        );
                        let harvest = harvester.harvest(navigator, &source, page).await;
                        outcome.rows_attempted += harvest.attempted;
                        outcome.artifacts_fetched += harvest.fetched;
                        outcome.records.extend(harvest.records);
                        state.record_page();
                        Phase::DeterminingNextPage { pager, label }
                    }
                }

                Phase::DeterminingNextPage { pager, label } => {
                    match decide_next(&state, &pager, label.as_deref()) {
                        Ok(control) => Phase::Paginating(control),
                        Err(reason) => Phase::Done(reason),
                    }
                }

                Phase::Paginating(control) => match navigator.activate(&control).await {
                    Ok(()) => Phase::Fetching,
                    Err(e) => {
                        log::error!("[{scope}] could not open page '{}': {e}", control.text);
                        Phase::Done(StopReason::aborted(&e))
                    }
                },

                Phase::Done(reason) => break reason,
            };
        };

        log::info!(
            "[{scope}] done after {} page(s): {stop}",
            state.pages_visited()
        );
        outcome.pages = state.pages_visited();
        outcome.stop = stop;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::scripted::ScriptedNavigator;
    use crate::services::harvester::PageHarvest;
    use async_trait::async_trait;

    /// Records the label cell of each harvested page.
    struct LabelHarvester;

    #[async_trait]
    impl Harvester for LabelHarvester {
        type Record = String;

        async fn harvest(
            &mut self,
            _navigator: &mut dyn Navigator,
            source: &str,
            _page: usize,
        ) -> PageHarvest<String> {
            let label = current_label(&pager_cells(source, &PagerSelectors::default()).unwrap())
                .unwrap_or("-")
                .to_string();
            PageHarvest {
                records: vec![label],
                attempted: 1,
                fetched: 1,
            }
        }
    }

    /// A listing page whose pager shows `label` as current and links to `links`.
    fn page(label: &str, links: &[&str]) -> String {
        let mut cells = format!("<td><span>{label}</span></td>");
        for link in links {
            cells.push_str(&format!("<td><a href=\"p{link}\">{link}</a></td>"));
        }
        format!(
            "<html><body><div><table id=\"list\"><tr class=\"pager\"><td>\
             <table><tr>{cells}</tr></table></td></tr></table></div></body></html>"
        )
    }

    fn five_pages() -> ScriptedNavigator {
        ScriptedNavigator::new([
            ("start", page("1", &["2", "3", "4", "5"])),
            ("p2", page("2", &["1", "3", "4", "5"])),
            ("p3", page("3", &["1", "2", "4", "5"])),
            ("p4", page("4", &["1", "2", "3", "5"])),
            ("p5", page("5", &["1", "2", "3", "4"])),
        ])
    }

    async fn run(
        nav: &mut ScriptedNavigator,
        limit: Option<usize>,
    ) -> ScopeOutcome<String> {
        let pager = PagerSelectors::default();
        let traverser = PaginationTraverser::new("#list", &pager, limit);
        nav.reach_page(&crate::navigation::PageTarget::new("start"))
            .await
            .unwrap();
        traverser.traverse("test", nav, &mut LabelHarvester).await
    }

    #[test]
    fn reads_pager_cells() {
        let cells = pager_cells(&page("2", &["1", "3"]), &PagerSelectors::default()).unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(current_label(&cells), Some("2"));
        assert_eq!(cells[1].link, Some(Control::link("1", "p1")));
    }

    #[test]
    fn next_link_skips_visited_labels() {
        let cells = pager_cells(&page("2", &["1", "3"]), &PagerSelectors::default()).unwrap();
        let mut state = TraversalState::new(None);
        state.mark_visited("1");
        state.mark_visited("2");
        assert_eq!(next_link(&state, &cells).unwrap().text, "3");
        state.mark_visited("3");
        assert!(next_link(&state, &cells).is_none());
    }

    #[test]
    fn no_pager_means_single_page() {
        let state = TraversalState::new(None);
        assert_eq!(decide_next(&state, &[], None), Err(StopReason::NoNextPage));
        let unlabeled = vec![PagerCell {
            text: "2".into(),
            link: Some(Control::link("2", "p2")),
        }];
        assert_eq!(
            decide_next(&state, &unlabeled, None),
            Err(StopReason::UnlabeledPage)
        );
    }

    #[tokio::test]
    async fn visits_every_page_once() {
        let mut nav = five_pages();
        let outcome = run(&mut nav, None).await;
        assert_eq!(outcome.records, ["1", "2", "3", "4", "5"]);
        assert_eq!(outcome.pages, 5);
        assert_eq!(nav.trail, ["start", "p2", "p3", "p4", "p5"]);
        assert_eq!(outcome.stop, StopReason::NoNextPage);
    }

    #[tokio::test]
    async fn limit_stops_after_exactly_n_pages() {
        let mut nav = five_pages();
        let outcome = run(&mut nav, Some(2)).await;
        assert_eq!(outcome.records, ["1", "2"]);
        assert_eq!(outcome.stop, StopReason::LimitReached { limit: 2 });
    }

    #[tokio::test]
    async fn repeated_label_stops_before_harvesting() {
        // Page "3" links to "4", but the site serves page "2" again.
        let mut nav = ScriptedNavigator::new([
            ("start", page("1", &["2", "3"])),
            ("p2", page("2", &["1", "3"])),
            ("p3", page("3", &["1", "2", "4"])),
            ("p4", page("2", &["1", "3"])),
        ]);
        let outcome = run(&mut nav, None).await;
        assert_eq!(outcome.records, ["1", "2", "3"]);
        assert_eq!(
            outcome.stop,
            StopReason::CycleDetected { label: "2".into() }
        );
    }

    #[tokio::test]
    async fn timeout_ends_scope_and_keeps_records() {
        // "p2" is not served, so waiting for the listing times out.
        let mut nav = ScriptedNavigator::new([("start", page("1", &["2"]))]);
        let outcome = run(&mut nav, None).await;
        assert_eq!(outcome.records, ["1"]);
        assert_eq!(outcome.pages, 1);
        match &outcome.stop {
            StopReason::Aborted { reason } => assert!(reason.starts_with("timeout: ")),
            other => panic!("expected abort, got {other:?}"),
        }
    }
}
