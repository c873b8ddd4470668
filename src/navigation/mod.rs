// src/navigation/mod.rs

//! Navigation and page inspection capabilities.
//!
//! The traversal core only needs to reach a page state, activate controls,
//! pick drop-down values and wait (bounded) for elements to appear. How that
//! happens is up to the [`Navigator`] implementation: [`HttpNavigator`]
//! drives plain HTTP listings, tests use a scripted in-memory navigator.
//!
//! Page content crosses await points as source text; [`inspect`] parses it
//! synchronously.

mod http;
pub mod inspect;
#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;

use crate::error::Result;

pub use http::HttpNavigator;

/// A page state that can be reached directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    pub url: String,
}

impl PageTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// An activatable element (link or button) found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    /// Visible text
    pub text: String,

    /// Link target, when the control is a link
    pub href: Option<String>,
}

impl Control {
    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
        }
    }
}

/// The single navigable session a traversal owns.
#[async_trait]
pub trait Navigator: Send {
    /// Go to a page state, bounded by the navigator's wait timeout.
    async fn reach_page(&mut self, target: &PageTarget) -> Result<()>;

    /// Activate a control on the current page.
    async fn activate(&mut self, control: &Control) -> Result<()>;

    /// Select the option with visible text `value` in drop-down `control`.
    async fn select_option(&mut self, control: &str, value: &str) -> Result<()>;

    /// Press the submit button with id `control`, sending its form.
    async fn submit(&mut self, control: &str) -> Result<()>;

    /// Current page source, once `selector` is present.
    ///
    /// Fails with `NavigationTimeout` when the element never appears.
    async fn wait_for(&mut self, selector: &str) -> Result<String>;

    /// Open a second, independent context on `control`'s target.
    ///
    /// The returned context must be closed with [`IsolatedContext::close`].
    async fn open_isolated(&mut self, control: &Control) -> Result<Box<dyn IsolatedContext>>;
}

/// A temporary context borrowed next to the listing session.
#[async_trait]
pub trait IsolatedContext: Send {
    /// Context page source, once `selector` is present.
    async fn wait_for(&mut self, selector: &str) -> Result<String>;

    /// Move this context to `control`'s target (e.g. an embedded frame).
    async fn follow(&mut self, control: &Control) -> Result<()>;

    /// Release the context.
    async fn close(self: Box<Self>) -> Result<()>;
}
