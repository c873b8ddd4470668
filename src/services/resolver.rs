// src/services/resolver.rs

//! Deterministic artifact locations.

use super::extractor::DerivedKey;

/// Title used when the captured one is blank.
pub const UNTITLED: &str = "untitled";

/// Body used when the captured one is blank.
pub const EMPTY_BODY: &str = "<p>(no content)</p>";

/// Captured content wrapped as a standalone document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupDocument {
    pub title: String,
    pub html: String,
}

/// Where an artifact comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactLocation {
    /// Existing document to download
    Remote(String),
    /// Document to render from captured markup
    Markup(MarkupDocument),
}

/// Builds artifact locations. Pure: no I/O, same input gives same output.
#[derive(Debug, Clone)]
pub struct ArtifactResolver {
    url_template: String,
}

impl ArtifactResolver {
    /// `url_template` carries `{year}` and `{id}` placeholders.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
        }
    }

    /// Download location for a catalog entry.
    pub fn locate(&self, key: &DerivedKey) -> ArtifactLocation {
        ArtifactLocation::Remote(
            self.url_template
                .replace("{year}", &key.year)
                .replace("{id}", &key.document_id),
        )
    }

    /// Wrap a captured title and body into a minimal document.
    pub fn compose(&self, title: &str, body: &str) -> ArtifactLocation {
        let title = if title.trim().is_empty() {
            UNTITLED
        } else {
            title.trim()
        };
        let body = if body.trim().is_empty() { EMPTY_BODY } else { body };
        let html = format!(
            "<html>\n  <head><meta charset=\"utf-8\"><title>{t}</title></head>\n  <body>\n    <h1 class='center'>{t}</h1>\n    {body}\n  </body>\n</html>\n",
            t = escape_text(title),
        );
        ArtifactLocation::Markup(MarkupDocument {
            title: title.to_string(),
            html,
        })
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
