//! Page range resolution: explicit bounds, or the highest page advertised by the pagination
//! control of the first page.

use crate::model::PageRange;
use crate::scraper::catalog::{fetch_catalog_page, CatalogPage};
use crate::scraper::{element_text, parse_selector, Endpoints, PoliteClient, ScraperError};
use scraper::Html;

/// Resolve the inclusive range of catalog pages to crawl.
///
/// With an explicit `end`, only the bounds are validated and no request is made. Without one,
/// page `start` is fetched and its last `a.npage` link gives the end; a page with no
/// pagination control is a single-page catalog.
pub fn resolve_page_range(
    client: &mut PoliteClient,
    endpoints: &Endpoints,
    start: i64,
    end: Option<i64>,
) -> Result<PageRange, ScraperError> {
    if let Some(end) = end {
        return explicit_page_range(start, end);
    }
    let start_page = checked_page(start, start)?;

    let html = match fetch_catalog_page(client, endpoints, start_page)? {
        CatalogPage::Found(html) => html,
        CatalogPage::NotFound => {
            tracing::warn!(page = start_page, "start page redirected; catalog has no such page");
            return explicit_page_range(start, start);
        }
    };
    let end_page = last_page_number(&html, start_page)?
        .unwrap_or(start_page)
        .max(start_page);
    tracing::debug!(start = start_page, end = end_page, "resolved page range from pagination");
    explicit_page_range(start, end_page as i64)
}

/// Validate explicit bounds without any request.
pub fn explicit_page_range(start: i64, end: i64) -> Result<PageRange, ScraperError> {
    let s = checked_page(start, end)?;
    let e = checked_page(end, start).map_err(|_| ScraperError::InvalidRange { start, end })?;
    PageRange::new(s, e).ok_or(ScraperError::InvalidRange { start, end })
}

/// Convert a user-supplied bound to a page number (>= 1). `other` is only used in the error.
fn checked_page(value: i64, other: i64) -> Result<u32, ScraperError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v >= 1)
        .ok_or(ScraperError::InvalidRange {
            start: value,
            end: other,
        })
}

/// Highest page number in the pagination control: the text of the last `a.npage` link.
/// Returns `Ok(None)` when the page has no pagination control.
pub(crate) fn last_page_number(html: &str, page: u32) -> Result<Option<u32>, ScraperError> {
    let doc = Html::parse_document(html);
    let npage_sel = parse_selector("a.npage")?;
    let Some(last) = doc.select(&npage_sel).last() else {
        return Ok(None);
    };
    let text = element_text(last);
    text.parse::<u32>()
        .map(Some)
        .map_err(|_| ScraperError::CatalogParse {
            page,
            reason: format!("pagination link {:?} is not a page number", text),
        })
}
