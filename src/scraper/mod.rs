//! Catalog pipeline: page range, catalog pages, entries, availability, metadata, artifacts,
//! and the aggregator that ties them together.

mod client;
mod error;

pub mod aggregate;
pub mod availability;
pub mod catalog;
pub mod download;
pub mod metadata;
pub mod range;

pub use aggregate::{CatalogCrawler, CrawlOptions, CrawlSummary};
pub use availability::{check_availability, Availability};
pub use catalog::{extract_entries, fetch_catalog_page, CatalogPage, Entries};
pub use client::{PoliteClient, PoliteClientBuilder};
pub use download::{download_image, download_text};
pub use error::ScraperError;
pub use metadata::{parse_metadata, sanitize_filename, BookMetadata};
pub use range::{explicit_page_range, resolve_page_range};

use reqwest::Url;
use scraper::Selector;

pub const DEFAULT_CATALOG_URL: &str = "https://tululu.org/l55/";
pub const DEFAULT_SITE_URL: &str = "https://tululu.org/";
pub const DEFAULT_DOWNLOAD_URL: &str = "https://tululu.org/txt.php";

/// Remote endpoints used by the pipeline, parsed once and passed to every fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Catalog listing; the page number is joined as a relative segment (`.../l55/` + `3`).
    pub catalog_url: Url,
    /// Base for resolving book-card links into detail page URLs.
    pub site_url: Url,
    /// Text download endpoint, takes the entry id as the `id` query parameter.
    pub download_url: Url,
}

impl Endpoints {
    pub fn new(catalog_url: &str, site_url: &str, download_url: &str) -> Result<Self, ScraperError> {
        Ok(Self {
            catalog_url: parse_url(catalog_url)?,
            site_url: parse_url(site_url)?,
            download_url: parse_url(download_url)?,
        })
    }

    /// The tululu.org science-fiction catalog.
    pub fn tululu() -> Result<Self, ScraperError> {
        Self::new(DEFAULT_CATALOG_URL, DEFAULT_SITE_URL, DEFAULT_DOWNLOAD_URL)
    }

    /// URL of catalog page `page`.
    pub fn catalog_page_url(&self, page: u32) -> Result<Url, ScraperError> {
        self.catalog_url
            .join(&page.to_string())
            .map_err(|e| ScraperError::InvalidUrl {
                input: format!("{}{}", self.catalog_url, page),
                reason: e.to_string(),
            })
    }
}

fn parse_url(input: &str) -> Result<Url, ScraperError> {
    Url::parse(input).map_err(|e| ScraperError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a CSS selector. All selectors in this crate are literals, so a failure is a bug,
/// reported as a catalog parse error rather than a panic.
pub(crate) fn parse_selector(sel: &str) -> Result<Selector, ScraperError> {
    Selector::parse(sel).map_err(|e| ScraperError::CatalogParse {
        page: 0,
        reason: format!("invalid selector {:?}: {}", sel, e),
    })
}

/// Collapse the text content of an element into a trimmed string.
pub(crate) fn element_text(el: scraper::ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
