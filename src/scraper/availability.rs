//! Detail page availability. The site answers a 3xx for books that were withdrawn or are
//! restricted, so a redirect is a normal outcome here, separate from fetch failures.

use crate::model::CatalogEntry;
use crate::scraper::{PoliteClient, ScraperError};

/// Outcome of requesting a book's detail page.
#[derive(Debug)]
pub enum Availability {
    /// 2xx: the detail page HTML.
    Available(String),
    /// 3xx: the book is not retrievable.
    Withdrawn,
    /// Network failure, unreadable body, or any other status.
    TransientError(ScraperError),
}

/// Request the entry's detail page with redirects disabled and classify the response.
/// Never returns an error; failures are carried in [`Availability::TransientError`].
pub fn check_availability(client: &mut PoliteClient, entry: &CatalogEntry) -> Availability {
    let url = entry.detail_url.as_str();
    let response = match client.get(&entry.detail_url) {
        Ok(r) => r,
        Err(e) => {
            return Availability::TransientError(ScraperError::Network {
                url: url.to_string(),
                source: e,
            })
        }
    };
    let status = response.status();
    if status.is_redirection() {
        return Availability::Withdrawn;
    }
    if !status.is_success() {
        return Availability::TransientError(ScraperError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
            context: Some(format!("book {}", entry.id)),
        });
    }
    match response.text() {
        Ok(html) => Availability::Available(html),
        Err(e) => Availability::TransientError(ScraperError::BodyRead {
            url: url.to_string(),
            source: e,
        }),
    }
}
