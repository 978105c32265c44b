// 🌐 Source retrieval - raw CSV text from a URL or a local file
// One attempt per source, bounded by the configured timeout. No retries.

use crate::errors::{PipelineError, PipelineResult};
use crate::parser::SourceKind;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Where a source lives, decided from its location string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Http(String),
    File(PathBuf),
}

impl SourceLocation {
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            SourceLocation::Http(location.to_string())
        } else if let Some(path) = location.strip_prefix("file://") {
            SourceLocation::File(PathBuf::from(path))
        } else {
            SourceLocation::File(PathBuf::from(location))
        }
    }
}

fn retrieval_error(kind: SourceKind, location: &str, reason: impl ToString) -> PipelineError {
    PipelineError::SourceRetrieval {
        source_kind: kind,
        location: location.to_string(),
        reason: reason.to_string(),
    }
}

/// Fetch the full text of one source
pub fn fetch_text(kind: SourceKind, location: &str, timeout: Duration) -> PipelineResult<String> {
    info!(source = kind.code(), location, "fetching source");

    let text = match SourceLocation::parse(location) {
        SourceLocation::File(path) => {
            fs::read_to_string(&path).map_err(|e| retrieval_error(kind, location, e))?
        }
        SourceLocation::Http(url) => fetch_http(kind, &url, timeout)?,
    };

    info!(source = kind.code(), bytes = text.len(), "source retrieved");
    Ok(text)
}

#[cfg(feature = "fetch")]
fn fetch_http(kind: SourceKind, url: &str, timeout: Duration) -> PipelineResult<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| retrieval_error(kind, url, e))?;

    let resp = client.get(url).send().map_err(|e| retrieval_error(kind, url, e))?;
    if !resp.status().is_success() {
        return Err(retrieval_error(kind, url, format!("HTTP {}", resp.status())));
    }

    resp.text().map_err(|e| retrieval_error(kind, url, e))
}

#[cfg(not(feature = "fetch"))]
fn fetch_http(kind: SourceKind, url: &str, _timeout: Duration) -> PipelineResult<String> {
    Err(retrieval_error(
        kind,
        url,
        "HTTP sources need the `fetch` feature",
    ))
}

// ============================================================================
// TESTS
// ============================================================================
