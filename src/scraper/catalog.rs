//! Catalog listing pages: fetching one page and extracting its book cards.

use crate::model::CatalogEntry;
use crate::scraper::{parse_selector, Endpoints, PoliteClient, ScraperError};
use reqwest::Url;
use scraper::Html;

/// Result of fetching one catalog page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogPage {
    /// Raw page HTML.
    Found(String),
    /// The site redirected: the page number is past the end of the catalog.
    NotFound,
}

/// Fetch catalog page `page` without following redirects.
///
/// A 3xx is [`CatalogPage::NotFound`]. Any other non-2xx status, a network failure, or an
/// unreadable body is an error: catalog pages are expected to be reachable, so the caller
/// aborts the run.
pub fn fetch_catalog_page(
    client: &mut PoliteClient,
    endpoints: &Endpoints,
    page: u32,
) -> Result<CatalogPage, ScraperError> {
    let url = endpoints.catalog_page_url(page)?;
    let response = client.get(&url).map_err(|e| ScraperError::Network {
        url: url.to_string(),
        source: e,
    })?;
    let status = response.status();
    if status.is_redirection() {
        return Ok(CatalogPage::NotFound);
    }
    if !status.is_success() {
        return Err(ScraperError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
            context: Some(format!("catalog page {}", page)),
        });
    }
    response
        .text()
        .map(CatalogPage::Found)
        .map_err(|e| ScraperError::BodyRead {
            url: url.to_string(),
            source: e,
        })
}

/// Book cards of one catalog page, in document order.
///
/// The raw card links are collected when the page is parsed, since the parsed document does not
/// outlive [`extract_entries`]. Resolving a link against the site base and deriving the entry id
/// happen as the iterator is advanced. A card without a usable link yields a
/// [`ScraperError::CatalogParse`]; the iterator is finite and cannot be restarted.
#[derive(Debug)]
pub struct Entries {
    page: u32,
    base: Url,
    hrefs: std::vec::IntoIter<Option<String>>,
}

impl Iterator for Entries {
    type Item = Result<CatalogEntry, ScraperError>;

    fn next(&mut self) -> Option<Self::Item> {
        let href = self.hrefs.next()?;
        Some(self.resolve(href))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.hrefs.size_hint()
    }
}

impl ExactSizeIterator for Entries {}

impl Entries {
    fn resolve(&self, href: Option<String>) -> Result<CatalogEntry, ScraperError> {
        let href = href.ok_or_else(|| ScraperError::CatalogParse {
            page: self.page,
            reason: "book card has no link".to_string(),
        })?;
        let detail_url = self
            .base
            .join(href.trim())
            .map_err(|e| ScraperError::CatalogParse {
                page: self.page,
                reason: format!("book card link {:?}: {}", href, e),
            })?;
        let id = entry_id(&detail_url).ok_or_else(|| ScraperError::CatalogParse {
            page: self.page,
            reason: format!("book card link {:?} has no book segment", href),
        })?;
        Ok(CatalogEntry { id, detail_url })
    }
}

/// Locate every `table.d_book` card on a catalog page and take the `href` of its first link.
/// All cards are read up front; only link resolution is deferred to [`Entries`].
/// Nothing is deduplicated; pages are assumed disjoint.
pub fn extract_entries(html: &str, page: u32, base: &Url) -> Result<Entries, ScraperError> {
    let doc = Html::parse_document(html);
    let card_sel = parse_selector("table.d_book")?;
    let link_sel = parse_selector("a")?;
    let hrefs: Vec<Option<String>> = doc
        .select(&card_sel)
        .map(|card| {
            card.select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .filter(|h| !h.trim().is_empty())
                .map(String::from)
        })
        .collect();
    Ok(Entries {
        page,
        base: base.clone(),
        hrefs: hrefs.into_iter(),
    })
}

/// `/b239/` -> `239`. Any other last path segment is kept verbatim.
fn entry_id(url: &Url) -> Option<String> {
    let segment = url
        .path_segments()?
        .filter(|s| !s.is_empty())
        .last()?;
    let id = match segment.strip_prefix('b') {
        Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => digits,
        _ => segment,
    };
    Some(id.to_string())
}
