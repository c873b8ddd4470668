// src/navigation/scripted.rs

//! In-memory navigator over canned pages, for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{AppError, Result};

use super::inspect::PageView;
use super::{Control, IsolatedContext, Navigator, PageTarget};

/// Pages are keyed by target url / link href. Selecting an option moves to
/// `"{current}|{control}={value}"`, submitting to `"{current}|submit={control}"`.
pub(crate) struct ScriptedNavigator {
    pages: Arc<HashMap<String, String>>,
    current: Option<String>,
    pub(crate) trail: Vec<String>,
    pub(crate) opened: Arc<AtomicUsize>,
    pub(crate) closed: Arc<AtomicUsize>,
}

impl ScriptedNavigator {
    pub(crate) fn new<K: Into<String>>(pages: impl IntoIterator<Item = (K, String)>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            current: None,
            trail: Vec::new(),
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn visit(&mut self, key: String) {
        self.trail.push(key.clone());
        self.current = Some(key);
    }
}

fn wait_in(pages: &HashMap<String, String>, key: Option<&str>, selector: &str) -> Result<String> {
    let source = key.and_then(|k| pages.get(k));
    match source {
        Some(src) if PageView::parse(src).contains(selector)? => Ok(src.clone()),
        _ => Err(AppError::timeout(
            format!("'{selector}' on {}", key.unwrap_or("<nothing>")),
            0,
        )),
    }
}

#[async_trait]
impl Navigator for ScriptedNavigator {
    async fn reach_page(&mut self, target: &PageTarget) -> Result<()> {
        self.visit(target.url.clone());
        Ok(())
    }

    async fn activate(&mut self, control: &Control) -> Result<()> {
        let href = control
            .href
            .clone()
            .ok_or_else(|| AppError::navigation("control without link"))?;
        self.visit(href);
        Ok(())
    }

    async fn select_option(&mut self, control: &str, value: &str) -> Result<()> {
        let base = self.current.clone().unwrap_or_default();
        self.visit(format!("{base}|{control}={value}"));
        Ok(())
    }

    async fn submit(&mut self, control: &str) -> Result<()> {
        let base = self.current.clone().unwrap_or_default();
        self.visit(format!("{base}|submit={control}"));
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str) -> Result<String> {
        wait_in(&self.pages, self.current.as_deref(), selector)
    }

    async fn open_isolated(&mut self, control: &Control) -> Result<Box<dyn IsolatedContext>> {
        let href = control
            .href
            .clone()
            .ok_or_else(|| AppError::navigation("control without link"))?;
        if !self.pages.contains_key(&href) {
            return Err(AppError::navigation(format!("cannot open {href}")));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedContext {
            pages: Arc::clone(&self.pages),
            current: href,
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct ScriptedContext {
    pages: Arc<HashMap<String, String>>,
    current: String,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl IsolatedContext for ScriptedContext {
    async fn wait_for(&mut self, selector: &str) -> Result<String> {
        wait_in(&self.pages, Some(&self.current), selector)
    }

    async fn follow(&mut self, control: &Control) -> Result<()> {
        self.current = control
            .href
            .clone()
            .ok_or_else(|| AppError::navigation("control without link"))?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
