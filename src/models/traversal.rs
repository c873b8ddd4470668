// src/models/traversal.rs

//! Traversal bookkeeping: per-scope state, scope identity and results.

use std::collections::HashSet;
use std::fmt;

use chrono::Month;
use serde::Serialize;

use crate::error::AppError;

/// Mutable state owned by one traversal scope.
#[derive(Debug, Clone, Default)]
pub struct TraversalState {
    visited: HashSet<String>,
    pages_visited: usize,
    limit: Option<usize>,
}

impl TraversalState {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn has_visited(&self, label: &str) -> bool {
        self.visited.contains(label)
    }

    /// Add a page label. Returns `false` when the label was already present.
    pub fn mark_visited(&mut self, label: &str) -> bool {
        self.visited.insert(label.to_string())
    }

    /// Count one more harvested page.
    pub fn record_page(&mut self) {
        self.pages_visited += 1;
    }

    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.pages_visited >= limit)
    }
}

/// Why a traversal scope ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// The current page label had been seen before
    CycleDetected { label: String },
    /// The configured page limit was reached
    LimitReached { limit: usize },
    /// No unvisited pager link remained
    NoNextPage,
    /// The page carried no identifiable label
    UnlabeledPage,
    /// A precondition timed out or navigation failed
    Aborted { reason: String },
}

impl StopReason {
    /// Scope abort carrying the failure family and message.
    pub fn aborted(error: &AppError) -> Self {
        Self::Aborted {
            reason: format!("{}: {error}", error.kind()),
        }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycleDetected { label } => write!(f, "page '{label}' already visited"),
            Self::LimitReached { limit } => write!(f, "page limit {limit} reached"),
            Self::NoNextPage => write!(f, "no more pages"),
            Self::UnlabeledPage => write!(f, "page without label"),
            Self::Aborted { reason } => write!(f, "aborted: {reason}"),
        }
    }
}

/// One independent `{section, year, month}` traversal scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionContext {
    pub section: String,
    pub year: i32,
    pub month: u32,
}

impl SectionContext {
    pub fn new(section: impl Into<String>, year: i32, month: u32) -> Self {
        Self {
            section: section.into(),
            year,
            month,
        }
    }

    /// English month name as shown in month drop-downs.
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("")
    }
}

impl fmt::Display for SectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{:02}", self.section, self.year, self.month)
    }
}

/// Records and counters produced by one traversal scope.
#[derive(Debug, Clone)]
pub struct ScopeOutcome<R> {
    pub scope: String,
    pub records: Vec<R>,
    pub pages: usize,
    pub rows_attempted: usize,
    pub artifacts_fetched: usize,
    pub stop: StopReason,
    pub reported_total: Option<u64>,
}

impl<R> ScopeOutcome<R> {
    pub fn new(scope: impl Into<String>, stop: StopReason) -> Self {
        Self {
            scope: scope.into(),
            records: Vec::new(),
            pages: 0,
            rows_attempted: 0,
            artifacts_fetched: 0,
            stop,
            reported_total: None,
        }
    }
}

/// Per-scope line of a run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeSummary {
    pub scope: String,
    pub pages: usize,
    pub records: usize,
    pub stop: StopReason,
    pub reported_total: Option<u64>,
}

/// Everything one execution produced, in traversal order.
#[derive(Debug, Clone)]
pub struct RunResult<R> {
    pub records: Vec<R>,
    pub rows_attempted: usize,
    pub artifacts_fetched: usize,
    pub scopes: Vec<ScopeSummary>,
}

impl<R> Default for RunResult<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rows_attempted: 0,
            artifacts_fetched: 0,
            scopes: Vec::new(),
        }
    }
}

impl<R> RunResult<R> {
    pub fn pages(&self) -> usize {
        self.scopes.iter().map(|s| s.pages).sum()
    }

    pub fn artifacts_missing(&self) -> usize {
        self.rows_attempted - self.artifacts_fetched
    }
}
