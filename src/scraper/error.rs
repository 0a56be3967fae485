//! Shared error type for the catalog pipeline.
//!
//! Run-scoped variants (`InvalidRange`, `InvalidUrl`, catalog-level `HttpStatus`/`Network`,
//! `CatalogParse`) abort a crawl. Entry-scoped variants (`MetadataShape`, `Download`) are
//! caught by the aggregator and only skip the entry or the artifact.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    // Range / configuration
    #[error("Invalid page range: start {start}, end {end}. Both must be >= 1 and start <= end.")]
    InvalidRange { start: i64, end: i64 },

    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    // HTTP and network
    #[error("Network error: could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus {
        status: u16,
        url: String,
        /// Optional context (e.g. "catalog page 3") for programmatic use.
        context: Option<String>,
    },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parsing
    #[error("Could not parse catalog page {page}: {reason}")]
    CatalogParse { page: u32, reason: String },

    #[error("Unexpected detail page layout at {url}: {reason}")]
    MetadataShape { url: String, reason: String },

    // Artifacts
    #[error("Download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
