// src/lib.rs

//! Gazette crawler library
//!
//! Walks paginated publication catalogs page by page, extracts one record
//! per listed row and retrieves (or renders) the document behind it.

pub mod error;
pub mod models;
pub mod navigation;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
