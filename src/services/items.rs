// src/services/items.rs

//! Per-item content capture for section listings.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{ItemRecord, SectionsConfig};
use crate::navigation::inspect::{self, PageView};
use crate::navigation::{Control, IsolatedContext, Navigator};
use crate::utils::filename::render_stem;

use super::fetcher::{ArtifactFetcher, FetchedArtifact};
use super::harvester::{Harvester, PageHarvest};
use super::resolver::{ArtifactLocation, ArtifactResolver};

/// One entry of a section listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedItem {
    pub title: String,
    pub date: String,
    pub control: Option<Control>,
}

/// Items on a listing page: link text as title, `span` text as date.
pub fn listing_items(source: &str, item_selector: &str) -> Result<Vec<ListedItem>> {
    let view = PageView::parse(source);
    view.locate_all(item_selector)?
        .into_iter()
        .map(|li| {
            let control = inspect::link_control(li)?;
            let date = inspect::locate_in(li, "span")?
                .map(inspect::text)
                .unwrap_or_default();
            Ok(ListedItem {
                title: control.as_ref().map(|c| c.text.clone()).unwrap_or_default(),
                date,
                control,
            })
        })
        .collect()
}

/// Captured `(title, body)` of an item page.
///
/// Both prefer the element's `value` attribute; the title falls back to the
/// element text and the body to its inner HTML. Missing elements read as
/// empty strings.
pub fn read_content(source: &str, layout: &SectionsConfig) -> Result<(String, String)> {
    let view = PageView::parse(source);
    let title = view
        .locate(&layout.title_selector)?
        .map(|e| inspect::attribute(e, "value").unwrap_or_else(|| inspect::text(e)))
        .unwrap_or_default();
    let body = view
        .locate(&layout.body_selector)?
        .map(|e| inspect::attribute(e, "value").unwrap_or_else(|| e.inner_html()))
        .unwrap_or_default();
    Ok((title, body))
}

/// The content frame on `source`, as a control to follow.
fn frame_control(source: &str, frame_selector: &str) -> Result<Option<Control>> {
    let view = PageView::parse(source);
    Ok(view
        .locate(frame_selector)?
        .and_then(|frame| inspect::attribute(frame, "src"))
        .map(|src| Control::link("frame", src)))
}

/// Opens each listed item in an isolated context and renders its content.
pub struct ItemHarvester<'a> {
    resolver: &'a ArtifactResolver,
    fetcher: &'a ArtifactFetcher,
    layout: &'a SectionsConfig,
    section: String,
    clock: fn() -> NaiveDateTime,
}

impl<'a> ItemHarvester<'a> {
    pub fn new(
        resolver: &'a ArtifactResolver,
        fetcher: &'a ArtifactFetcher,
        layout: &'a SectionsConfig,
        section: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            layout,
            section: section.into(),
            clock: local_now,
        }
    }

    /// Replace the timestamp source used for file names.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Open, read and close the isolated context, then render.
    ///
    /// The context is closed whether or not reading succeeded.
    async fn capture(
        &self,
        navigator: &mut dyn Navigator,
        control: &Control,
    ) -> Result<(String, FetchedArtifact)> {
        let mut context = navigator.open_isolated(control).await?;
        let captured = self.read_isolated(context.as_mut()).await;
        if let Err(e) = context.close().await {
            log::warn!("[{}] could not close item context: {e}", self.section);
        }
        let (title, body) = captured?;

        let location = self.resolver.compose(&title, &body);
        let title = match &location {
            ArtifactLocation::Markup(document) => document.title.clone(),
            ArtifactLocation::Remote(_) => title,
        };
        let stem = render_stem(&title, (self.clock)(), self.layout.title_max_len);
        let artifact = self.fetcher.fetch(&location, &stem).await?;
        Ok((title, artifact))
    }

    async fn read_isolated(&self, context: &mut dyn IsolatedContext) -> Result<(String, String)> {
        let content = &self.layout.content_selector;
        let source = match &self.layout.content_frame_selector {
            Some(frame) => {
                let source = context.wait_for(&format!("{frame}, {content}")).await?;
                match frame_control(&source, frame)? {
                    Some(target) => {
                        context.follow(&target).await?;
                        context.wait_for(content).await?
                    }
                    None => source,
                }
            }
            None => context.wait_for(content).await?,
        };
        read_content(&source, self.layout)
    }
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[async_trait]
impl Harvester for ItemHarvester<'_> {
    type Record = ItemRecord;

    async fn harvest(
        &mut self,
        navigator: &mut dyn Navigator,
        source: &str,
        page: usize,
    ) -> PageHarvest<ItemRecord> {
        let section = self.section.clone();
        let items = match listing_items(source, &self.layout.item_selector) {
            Ok(items) => items,
            Err(e) => {
                log::error!("[{section}] page {page}: {e}");
                return PageHarvest::default();
            }
        };
        log::info!("[{section}] page {page}: {} item(s)", items.len());

        let mut harvest = PageHarvest::default();
        for (i, item) in items.into_iter().enumerate() {
            let n = i + 1;
            harvest.attempted += 1;
            let mut record = ItemRecord {
                section: section.clone(),
                title: item.title.clone(),
                date: item.date.clone(),
                pdf_path: String::new(),
            };

            let Some(control) = item.control.as_ref() else {
                log::warn!("[{section}] page {page} item {n}: no link to open");
                harvest.records.push(record);
                continue;
            };

            match self.capture(navigator, control).await {
                Ok((title, artifact)) => {
                    log::info!(
                        "[{section}] {title} | {} | {}",
                        record.date,
                        artifact.path.display()
                    );
                    record.title = title;
                    record.pdf_path = artifact.path_string();
                    harvest.fetched += 1;
                }
                Err(e) => log::warn!(
                    "[{section}] page {page} item {n} '{}' not captured ({}): {e}",
                    item.title,
                    e.kind()
                ),
            }
            harvest.records.push(record);
        }
        harvest
    }
}
