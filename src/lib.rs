//! tululu-scrape: crawl a paginated book catalog, download texts and covers, and collect
//! bibliographic metadata into a JSON catalog.

pub mod cli;
pub mod config;
pub mod logging;
pub mod model;
pub mod output;
pub mod scraper;

// Re-exports for CLI and consumers.
pub use model::{BookRecord, CatalogEntry, CatalogOutput, PageRange};
pub use output::{read_catalog, write_catalog, OutputError};
pub use scraper::{
    check_availability, resolve_page_range, Availability, CatalogCrawler, CrawlOptions,
    CrawlSummary, Endpoints, PoliteClient, PoliteClientBuilder, ScraperError,
};
