//! Text and cover downloads. Files land under `<root>/books/` and `<root>/images/`; the
//! returned paths are relative to `<root>`. Existing files are overwritten.

use crate::scraper::{sanitize_filename, Endpoints, PoliteClient, ScraperError};
use reqwest::Url;
use std::path::{Path, PathBuf};

pub const BOOKS_DIR: &str = "books";
pub const IMAGES_DIR: &str = "images";

/// Download the plain text of book `id` and save it as `books/<title>.txt`.
///
/// `title` must already be sanitized (see [`sanitize_filename`]).
pub fn download_text(
    client: &mut PoliteClient,
    endpoints: &Endpoints,
    id: &str,
    title: &str,
    root: &Path,
) -> Result<PathBuf, ScraperError> {
    let response = client
        .get_with_query(&endpoints.download_url, &[("id", id)])
        .map_err(|e| ScraperError::Network {
            url: format!("{}?id={}", endpoints.download_url, id),
            source: e,
        })?;
    let body = read_success_body(response)?;
    let relative = Path::new(BOOKS_DIR).join(format!("{}.txt", title));
    save(root, &relative, &body)?;
    Ok(relative)
}

/// Download the cover at `image_url` and save it under `images/`, named after the last
/// segment of the URL path.
pub fn download_image(
    client: &mut PoliteClient,
    image_url: &Url,
    root: &Path,
) -> Result<PathBuf, ScraperError> {
    let filename = image_filename(image_url).ok_or_else(|| ScraperError::Download {
        url: image_url.to_string(),
        reason: "image URL has no file name".to_string(),
    })?;
    let response = client.get(image_url).map_err(|e| ScraperError::Network {
        url: image_url.to_string(),
        source: e,
    })?;
    let body = read_success_body(response)?;
    let relative = Path::new(IMAGES_DIR).join(filename);
    save(root, &relative, &body)?;
    Ok(relative)
}

fn read_success_body(response: reqwest::blocking::Response) -> Result<Vec<u8>, ScraperError> {
    let url = response.url().to_string();
    let status = response.status();
    if status.is_redirection() {
        return Err(ScraperError::Download {
            url,
            reason: format!("redirected (HTTP {})", status.as_u16()),
        });
    }
    if !status.is_success() {
        return Err(ScraperError::Download {
            url,
            reason: format!("HTTP {}", status.as_u16()),
        });
    }
    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| ScraperError::BodyRead { url, source: e })
}

/// Write `body` to `root/relative`, creating the parent directory if needed.
fn save(root: &Path, relative: &Path, body: &[u8]) -> Result<(), ScraperError> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ScraperError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(&path, body).map_err(|e| ScraperError::Io { path, source: e })
}

fn image_filename(url: &Url) -> Option<String> {
    let last = url.path_segments()?.last()?;
    let name = sanitize_filename(last);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
