// src/services/aggregator.rs

//! Merges scope outcomes into one run result.

use crate::models::{RunResult, ScopeOutcome, ScopeSummary};

/// Collects records across scopes in traversal order.
///
/// Nothing is persisted here; the caller serializes [`RunResult`] once the
/// run is over, whatever the scopes ended with.
#[derive(Debug)]
pub struct ResultAggregator<R> {
    result: RunResult<R>,
}

impl<R> Default for ResultAggregator<R> {
    fn default() -> Self {
        Self {
            result: RunResult::default(),
        }
    }
}

impl<R> ResultAggregator<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one finished scope.
    pub fn absorb(&mut self, outcome: ScopeOutcome<R>) {
        self.result.scopes.push(ScopeSummary {
            scope: outcome.scope,
            pages: outcome.pages,
            records: outcome.records.len(),
            stop: outcome.stop,
            reported_total: outcome.reported_total,
        });
        self.result.rows_attempted += outcome.rows_attempted;
        self.result.artifacts_fetched += outcome.artifacts_fetched;
        self.result.records.extend(outcome.records);
    }

    pub fn finish(self) -> RunResult<R> {
        self.result
    }
}
