// src/utils/filename.rs

//! File naming for persisted artifacts.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Character substituted for anything that is not alphanumeric.
pub const REPLACEMENT: char = '_';

/// Keep alphanumeric characters, replace the rest, cut to `max_len` chars.
pub fn sanitize_title(title: &str, max_len: usize) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { REPLACEMENT })
        .take(max_len)
        .collect();
    if cleaned.is_empty() {
        "untitled".chars().take(max_len).collect()
    } else {
        cleaned
    }
}

/// `{YYYYMMDD_HHMMSS}_{sanitized title}`
pub fn render_stem(title: &str, captured_at: NaiveDateTime, max_len: usize) -> String {
    format!(
        "{}{REPLACEMENT}{}",
        captured_at.format("%Y%m%d_%H%M%S"),
        sanitize_title(title, max_len)
    )
}

/// Write `bytes` to `{dir}/{stem}.{ext}` without ever replacing a file.
///
/// When the name is taken, `{stem}_2`, `{stem}_3`, ... are tried in turn.
/// A file that could not be written completely is removed again.
pub async fn write_unique(dir: &Path, stem: &str, ext: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let mut attempt = 1usize;
    loop {
        let name = if attempt == 1 {
            format!("{stem}.{ext}")
        } else {
            format!("{stem}{REPLACEMENT}{attempt}.{ext}")
        };
        let path = dir.join(name);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                let written = match file.write_all(bytes).await {
                    Ok(()) => file.flush().await,
                    Err(e) => Err(e),
                };
                drop(file);
                return keep_or_discard(path, written).await;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

async fn keep_or_discard(path: PathBuf, written: std::io::Result<()>) -> Result<PathBuf> {
    match written {
        Ok(()) => Ok(path),
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                log::warn!("Could not remove partial file {}: {cleanup}", path.display());
            }
            Err(e.into())
        }
    }
}
