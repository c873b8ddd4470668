// src/navigation/http.rs

//! Navigation over plain HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::Instant;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::utils::http;

use super::inspect::{self, PageView};
use super::{Control, IsolatedContext, Navigator, PageTarget};

/// A fetched page and the URL it came from.
#[derive(Debug, Clone)]
struct LoadedPage {
    url: Url,
    source: String,
}

/// Timing shared by the session and its isolated contexts.
#[derive(Debug, Clone, Copy)]
struct Timing {
    wait: Duration,
    poll: Duration,
    settle: Duration,
}

/// [`Navigator`] for listings whose controls are ordinary links and GET forms.
///
/// Forms are always sent as GET queries; pages that only accept posted
/// forms need a browser-driven navigator.
pub struct HttpNavigator {
    client: Client,
    timing: Timing,
    current: Option<LoadedPage>,
}

impl HttpNavigator {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::with_client(http::create_async_client(config)?, config))
    }

    pub fn with_client(client: Client, config: &CrawlerConfig) -> Self {
        Self {
            client,
            timing: Timing {
                wait: Duration::from_secs(config.wait_timeout_secs),
                poll: Duration::from_millis(config.poll_interval_ms),
                settle: Duration::from_millis(config.request_delay_ms),
            },
            current: None,
        }
    }

    /// URL of the page the session is on.
    pub fn current_url(&self) -> Option<&Url> {
        self.current.as_ref().map(|p| &p.url)
    }

    fn page(&self) -> Result<&LoadedPage> {
        self.current
            .as_ref()
            .ok_or_else(|| AppError::navigation("no page loaded yet"))
    }
}

#[async_trait]
impl Navigator for HttpNavigator {
    async fn reach_page(&mut self, target: &PageTarget) -> Result<()> {
        let url = Url::parse(&target.url)?;
        self.current = Some(load(&self.client, url, self.timing.wait).await?);
        Ok(())
    }

    async fn activate(&mut self, control: &Control) -> Result<()> {
        let url = resolve_control(&self.page()?.url, control)?;
        self.current = Some(load(&self.client, url, self.timing.wait).await?);
        if !self.timing.settle.is_zero() {
            tokio::time::sleep(self.timing.settle).await;
        }
        Ok(())
    }

    async fn select_option(&mut self, control: &str, value: &str) -> Result<()> {
        let page = self.page()?;
        let (name, option_value) = resolve_option(&page.source, control, value)?;
        let url = with_query_param(&page.url, &name, &option_value);
        log::debug!("Selecting {control}={value} via {url}");
        self.current = Some(load(&self.client, url, self.timing.wait).await?);
        Ok(())
    }

    async fn submit(&mut self, control: &str) -> Result<()> {
        let page = self.page()?;
        let url = resolve_submit(&page.url, &page.source, control)?;
        log::debug!("Submitting {control} via {url}");
        self.current = Some(load(&self.client, url, self.timing.wait).await?);
        if !self.timing.settle.is_zero() {
            tokio::time::sleep(self.timing.settle).await;
        }
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str) -> Result<String> {
        let timing = self.timing;
        let page = self
            .current
            .as_mut()
            .ok_or_else(|| AppError::navigation("no page loaded yet"))?;
        poll_for(&self.client, page, selector, timing).await
    }

    async fn open_isolated(&mut self, control: &Control) -> Result<Box<dyn IsolatedContext>> {
        let url = resolve_control(&self.page()?.url, control)?;
        let page = load(&self.client, url, self.timing.wait).await?;
        log::debug!("Opened isolated context on {}", page.url);
        Ok(Box::new(HttpContext {
            client: self.client.clone(),
            timing: self.timing,
            page,
        }))
    }
}

/// Independent page context sharing the session's client.
struct HttpContext {
    client: Client,
    timing: Timing,
    page: LoadedPage,
}

#[async_trait]
impl IsolatedContext for HttpContext {
    async fn wait_for(&mut self, selector: &str) -> Result<String> {
        poll_for(&self.client, &mut self.page, selector, self.timing).await
    }

    async fn follow(&mut self, control: &Control) -> Result<()> {
        let url = resolve_control(&self.page.url, control)?;
        self.page = load(&self.client, url, self.timing.wait).await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        log::debug!("Closed isolated context on {}", self.page.url);
        Ok(())
    }
}

async fn load(client: &Client, url: Url, wait: Duration) -> Result<LoadedPage> {
    let source = tokio::time::timeout(wait, http::fetch_text(client, url.as_str()))
        .await
        .map_err(|_| AppError::timeout(format!("navigation to {url}"), wait.as_secs()))??;
    Ok(LoadedPage { url, source })
}

/// Re-poll `page` until `selector` is present or the wait deadline passes.
async fn poll_for(
    client: &Client,
    page: &mut LoadedPage,
    selector: &str,
    timing: Timing,
) -> Result<String> {
    let deadline = Instant::now() + timing.wait;
    loop {
        if page_has(&page.source, selector)? {
            return Ok(page.source.clone());
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(AppError::timeout(
                format!("'{selector}' on {}", page.url),
                timing.wait.as_secs(),
            ));
        }
        tokio::time::sleep(timing.poll.min(deadline - now)).await;
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            continue;
        }
        let url = page.url.clone();
        *page = load(client, url.clone(), remaining)
            .await
            .map_err(|e| match e {
                AppError::NavigationTimeout { .. } => {
                    AppError::timeout(format!("'{selector}' on {url}"), timing.wait.as_secs())
                }
                other => other,
            })?;
    }
}

fn page_has(source: &str, selector: &str) -> Result<bool> {
    PageView::parse(source).contains(selector)
}

fn resolve_control(base: &Url, control: &Control) -> Result<Url> {
    let href = control
        .href
        .as_deref()
        .ok_or_else(|| AppError::navigation(format!("control '{}' has no link", control.text)))?;
    if href.trim_start().starts_with("javascript:") {
        return Err(AppError::navigation(format!(
            "control '{}' needs script execution",
            control.text
        )));
    }
    Ok(base.join(href)?)
}

/// Map a drop-down's visible option text to its form name and value.
fn resolve_option(source: &str, control: &str, value: &str) -> Result<(String, String)> {
    let view = PageView::parse(source);
    let select = view
        .locate(&format!("select#{control}"))?
        .ok_or_else(|| AppError::navigation(format!("drop-down '{control}' not found")))?;
    let name = inspect::attribute(select, "name").unwrap_or_else(|| control.to_string());
    let option = inspect::locate_all_in(select, "option")?
        .into_iter()
        .find(|o| inspect::text(*o) == value)
        .ok_or_else(|| {
            AppError::navigation(format!("drop-down '{control}' has no option '{value}'"))
        })?;
    let option_value = inspect::attribute(option, "value").unwrap_or_else(|| value.to_string());
    Ok((name, option_value))
}

/// Query URL sent when the button `#control` submits its enclosing form.
///
/// Values already chosen in the current URL override the form's defaults.
fn resolve_submit(base: &Url, source: &str, control: &str) -> Result<Url> {
    let view = PageView::parse(source);
    let button_selector = format!("#{control}");
    let mut located = None;
    for form in view.locate_all("form")? {
        if let Some(button) = inspect::locate_in(form, &button_selector)? {
            located = Some((form, button));
            break;
        }
    }
    let (form, button) = located
        .ok_or_else(|| AppError::navigation(format!("submit control '{control}' not in a form")))?;

    let action = inspect::attribute(form, "action").filter(|a| !a.trim().is_empty());
    let mut fields = form_fields(form)?;
    if action.is_none() {
        for (name, value) in base.query_pairs() {
            match fields.iter_mut().find(|(k, _)| k.as_str() == &*name) {
                Some(field) => field.1 = value.into_owned(),
                None => fields.push((name.into_owned(), value.into_owned())),
            }
        }
    }
    if let Some(name) = inspect::attribute(button, "name") {
        if inspect::attribute(button, "type").as_deref() == Some("image") {
            fields.push((format!("{name}.x"), "0".into()));
            fields.push((format!("{name}.y"), "0".into()));
        } else {
            fields.push((name, inspect::attribute(button, "value").unwrap_or_default()));
        }
    }

    let mut target = match action {
        Some(action) => base.join(&action)?,
        None => base.clone(),
    };
    target.query_pairs_mut().clear().extend_pairs(fields);
    Ok(target)
}

/// Named values a form sends by default, buttons excluded.
fn form_fields(form: scraper::ElementRef<'_>) -> Result<Vec<(String, String)>> {
    let mut fields = Vec::new();
    for input in inspect::locate_all_in(form, "input[name]")? {
        let kind = inspect::attribute(input, "type").unwrap_or_default().to_ascii_lowercase();
        let unchecked = matches!(kind.as_str(), "checkbox" | "radio")
            && inspect::attribute(input, "checked").is_none();
        if unchecked || matches!(kind.as_str(), "submit" | "image" | "button" | "reset") {
            continue;
        }
        if let Some(name) = inspect::attribute(input, "name") {
            fields.push((name, inspect::attribute(input, "value").unwrap_or_default()));
        }
    }
    for select in inspect::locate_all_in(form, "select[name]")? {
        let options = inspect::locate_all_in(select, "option")?;
        let chosen = options
            .iter()
            .find(|o| inspect::attribute(**o, "selected").is_some())
            .or(options.first());
        if let (Some(name), Some(option)) = (inspect::attribute(select, "name"), chosen) {
            let value =
                inspect::attribute(*option, "value").unwrap_or_else(|| inspect::text(*option));
            fields.push((name, value));
        }
    }
    Ok(fields)
}

fn with_query_param(url: &Url, name: &str, value: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != name)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut next = url.clone();
    next.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(name, value);
    next
}
