//! Crawl orchestration: pages in order, entries in order, one request at a time.
//!
//! Failures are isolated per entry: withdrawn books, network failures on any of the entry's
//! requests and unexpected detail page layouts skip the entry. An artifact answered with a
//! non-2xx status, or one that cannot be written locally, only drops that artifact. Catalog
//! page failures abort the run.

use crate::model::{BookRecord, CatalogEntry, CatalogOutput, PageRange};
use crate::scraper::catalog::{extract_entries, fetch_catalog_page, CatalogPage};
use crate::scraper::{
    check_availability, download_image, download_text, parse_metadata, Availability, Endpoints,
    PoliteClient, ScraperError,
};
use std::path::PathBuf;

/// Options for a crawl run.
pub struct CrawlOptions<'a> {
    /// Destination root; artifacts go to `books/` and `images/` below it.
    pub dest_root: PathBuf,
    pub skip_texts: bool,
    pub skip_images: bool,
    /// Called before each catalog page with `(page, last page of the range)`.
    pub progress: Option<&'a dyn Fn(u32, u32)>,
}

/// Counters for the final report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_crawled: u32,
    pub entries_seen: usize,
    pub withdrawn: usize,
    pub failed: usize,
    /// First page number that redirected, if the catalog ended inside the range.
    pub catalog_ended_at: Option<u32>,
}

impl CrawlSummary {
    pub fn skipped(&self) -> usize {
        self.withdrawn + self.failed
    }
}

/// Why an entry produced no record.
enum Skip {
    Withdrawn,
    Failed(ScraperError),
}

/// Runs the pipeline over a page range. Owns the output collection for the duration of the run.
pub struct CatalogCrawler<'a> {
    client: &'a mut PoliteClient,
    endpoints: &'a Endpoints,
}

impl<'a> CatalogCrawler<'a> {
    pub fn new(client: &'a mut PoliteClient, endpoints: &'a Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// Crawl every page of `range` and return the records in discovery order.
    ///
    /// A redirected catalog page ends the run early without error. A catalog page that fails
    /// to load or whose cards cannot be parsed aborts the run.
    pub fn crawl(
        &mut self,
        range: PageRange,
        options: &CrawlOptions<'_>,
    ) -> Result<(CatalogOutput, CrawlSummary), ScraperError> {
        let mut output = CatalogOutput::new();
        let mut summary = CrawlSummary::default();

        for page in range.pages() {
            if let Some(progress) = options.progress {
                progress(page, range.end());
            }
            let html = match fetch_catalog_page(self.client, self.endpoints, page)? {
                CatalogPage::Found(html) => html,
                CatalogPage::NotFound => {
                    tracing::info!(page, "catalog page redirected; no more pages");
                    summary.catalog_ended_at = Some(page);
                    break;
                }
            };
            summary.pages_crawled += 1;

            let entries = extract_entries(&html, page, &self.endpoints.site_url)?;
            tracing::info!(page, books = entries.len(), "catalog page");
            for entry in entries {
                let entry = entry?;
                summary.entries_seen += 1;
                match self.process_entry(&entry, options) {
                    Ok(record) => output.push(record),
                    Err(Skip::Withdrawn) => {
                        summary.withdrawn += 1;
                        tracing::warn!(
                            id = %entry.id,
                            url = %entry.detail_url,
                            "book is withdrawn or restricted (redirected); skipped"
                        );
                    }
                    Err(Skip::Failed(e)) => {
                        summary.failed += 1;
                        tracing::warn!(id = %entry.id, error = %e, "book skipped");
                    }
                }
            }
        }

        Ok((output, summary))
    }

    fn process_entry(
        &mut self,
        entry: &CatalogEntry,
        options: &CrawlOptions<'_>,
    ) -> Result<BookRecord, Skip> {
        let html = match check_availability(self.client, entry) {
            Availability::Available(html) => html,
            Availability::Withdrawn => return Err(Skip::Withdrawn),
            Availability::TransientError(e) => return Err(Skip::Failed(e)),
        };
        let meta = parse_metadata(&html, &entry.detail_url).map_err(Skip::Failed)?;

        let text_path = if options.skip_texts {
            None
        } else {
            match download_text(
                self.client,
                self.endpoints,
                &entry.id,
                &meta.title,
                &options.dest_root,
            ) {
                Ok(path) => Some(path),
                Err(e) if is_transport_failure(&e) => return Err(Skip::Failed(e)),
                Err(e) => {
                    tracing::warn!(id = %entry.id, error = %e, "text not downloaded");
                    None
                }
            }
        };

        let image_path = match (&meta.image_url, options.skip_images) {
            (_, true) => None,
            (None, false) => {
                tracing::warn!(id = %entry.id, "detail page has no cover image");
                None
            }
            (Some(url), false) => match download_image(self.client, url, &options.dest_root) {
                Ok(path) => Some(path),
                Err(e) if is_transport_failure(&e) => return Err(Skip::Failed(e)),
                Err(e) => {
                    tracing::warn!(id = %entry.id, error = %e, "cover not downloaded");
                    None
                }
            },
        };

        tracing::debug!(id = %entry.id, title = %meta.title, "book recorded");
        Ok(BookRecord {
            title: meta.title,
            author: meta.author,
            genres: meta.genres,
            comments: meta.comments,
            text_path,
            image_path,
        })
    }
}

/// The request never produced a complete response, so the whole entry is dropped.
fn is_transport_failure(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::Network { .. } | ScraperError::BodyRead { .. }
    )
}
