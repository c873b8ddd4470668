// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client failed outside of an artifact download
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A listing row could not be turned into a derived artifact key
    #[error("Row {row}: {message}")]
    RowExtraction { row: usize, message: String },

    /// Artifact server answered with something other than 200
    #[error("Unexpected status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Artifact retrieval failed at the transport level
    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    /// Rendering backend could not convert captured markup
    #[error("Render backend failed for '{title}': {message}")]
    Render { title: String, message: String },

    /// A waited-for precondition never became true
    #[error("Timed out after {secs}s waiting for {what}")]
    NavigationTimeout { what: String, secs: u64 },

    /// Navigation could not be performed (missing control, bad target)
    #[error("Navigation error: {0}")]
    Navigation(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a row extraction error.
    pub fn row(row: usize, message: impl fmt::Display) -> Self {
        Self::RowExtraction {
            row,
            message: message.to_string(),
        }
    }

    /// Create a transport-level download error.
    pub fn download(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Download {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a render backend error.
    pub fn render(title: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Render {
            title: title.into(),
            message: message.to_string(),
        }
    }

    /// Create a navigation timeout error.
    pub fn timeout(what: impl Into<String>, secs: u64) -> Self {
        Self::NavigationTimeout {
            what: what.into(),
            secs,
        }
    }

    /// Create a navigation error.
    pub fn navigation(message: impl Into<String>) -> Self {
        Self::Navigation(message.into())
    }

    /// Short failure family tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HttpStatus { .. } => "status",
            Self::Download { .. } | Self::Http(_) => "transport",
            Self::Render { .. } => "render",
            Self::RowExtraction { .. } => "row",
            Self::NavigationTimeout { .. } => "timeout",
            Self::Navigation(_) => "navigation",
            Self::Io(_) => "io",
            _ => "other",
        }
    }
}
