//! Data model for a catalog crawl.
//!
//! `BookRecord` is the only shape that leaves the crate: the renderer consumes a JSON array of
//! records, so its serialized key names are fixed.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Inclusive range of catalog page numbers. Both bounds are >= 1 and `start <= end`;
/// construct through [`PageRange::new`] or the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    /// Returns `None` when either bound is zero or `start > end`.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        if start == 0 || end == 0 || start > end {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of pages in the range.
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// A valid range always holds at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn pages(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }
}

/// One book card found on a catalog page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Opaque identifier, e.g. `239` for `/b239/`. Also used as the text download id.
    pub id: String,
    pub detail_url: Url,
}

/// One successfully processed book.
///
/// `genres` and `comments` are empty lists when the page lists none. Artifact paths are
/// relative to the destination root and are `None` when the download was skipped or failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    #[serde(rename = "genre")]
    pub genres: Vec<String>,
    pub comments: Vec<String>,
    #[serde(rename = "book_path")]
    pub text_path: Option<PathBuf>,
    #[serde(rename = "img_path")]
    pub image_path: Option<PathBuf>,
}

/// Records in crawl discovery order (page order, then in-page order).
pub type CatalogOutput = Vec<BookRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn sample_record() -> BookRecord {
        BookRecord {
            title: "Алиса в стране чудес".to_string(),
            author: "Льюис Кэрролл".to_string(),
            genres: vec!["Научная фантастика".to_string(), "Сказки".to_string()],
            comments: vec!["Отличная книга".to_string()],
            text_path: Some(PathBuf::from("books/Алиса в стране чудес.txt")),
            image_path: None,
        }
    }

    #[test]
    fn page_range_len_counts_both_bounds() {
        for (start, end) in [(1, 1), (1, 10), (4, 7), (100, 250)] {
            let range = PageRange::new(start, end).expect("valid range");
            assert_eq!(range.len(), end - start + 1);
            assert_eq!(range.pages().count() as u32, range.len());
        }
    }

    #[test]
    fn page_range_rejects_zero_and_inverted_bounds() {
        assert!(PageRange::new(0, 5).is_none());
        assert!(PageRange::new(3, 0).is_none());
        assert!(PageRange::new(5, 4).is_none());
    }

    #[test]
    fn record_serializes_with_renderer_keys() -> Result<(), Box<dyn Error>> {
        let json = serde_json::to_string(&sample_record())?;
        let value: serde_json::Value = serde_json::from_str(&json)?;
        let obj = value.as_object().ok_or("root must be object")?;
        for key in ["title", "author", "genre", "comments", "book_path", "img_path"] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj.len(), 6);
        assert_eq!(
            obj["book_path"].as_str(),
            Some("books/Алиса в стране чудес.txt")
        );
        assert!(obj["img_path"].is_null());
        assert_eq!(obj["genre"].as_array().map(|a| a.len()), Some(2));
        // Non-ASCII text is written as-is, not escaped.
        assert!(json.contains("Льюис Кэрролл"));
        Ok(())
    }

    #[test]
    fn record_with_empty_lists_keeps_lists() -> Result<(), Box<dyn Error>> {
        let record = BookRecord {
            genres: Vec::new(),
            comments: Vec::new(),
            ..sample_record()
        };
        let value = serde_json::to_value(&record)?;
        assert_eq!(value["genre"], serde_json::json!([]));
        assert_eq!(value["comments"], serde_json::json!([]));
        Ok(())
    }
}
