// src/utils/mod.rs

//! Utility functions and helpers.

pub mod csv;
pub mod filename;
pub mod http;
pub mod log;

use std::sync::LazyLock;

use regex::Regex;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid number pattern"));

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Substring after the last occurrence of `delimiter`, or the whole string
/// when the delimiter is absent.
pub fn last_segment(s: &str, delimiter: char) -> &str {
    s.rsplit(delimiter).next().unwrap_or(s)
}

/// First unsigned integer appearing in `text`.
pub fn first_number(text: &str) -> Option<u64> {
    NUMBER.find(text)?.as_str().parse().ok()
}
