//! Bibliographic metadata from a book's detail page.

use crate::scraper::{element_text, parse_selector, ScraperError};
use reqwest::Url;
use scraper::Html;

/// Separator between author and title in the page heading (`Author \u{a0}::\u{a0} Title`).
const HEADING_SEPARATOR: &str = "::";
/// Upper bound for a sanitized file name, in bytes.
const MAX_FILENAME_BYTES: usize = 255;
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Fields extracted from one detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    /// Sanitized; safe to use as a file name.
    pub title: String,
    /// Sanitized like `title`.
    pub author: String,
    pub genres: Vec<String>,
    pub comments: Vec<String>,
    /// Cover image, resolved against the detail page URL. `None` when the page has no cover element.
    pub image_url: Option<Url>,
}

/// Parse a detail page fetched from `page_url`.
///
/// The heading must contain the separator exactly once with a non-empty part on each side,
/// otherwise the page layout is not understood and [`ScraperError::MetadataShape`] is returned.
/// A cover element without a usable `src` is the same error.
pub fn parse_metadata(html: &str, page_url: &Url) -> Result<BookMetadata, ScraperError> {
    let doc = Html::parse_document(html);
    let shape_err = |reason: String| ScraperError::MetadataShape {
        url: page_url.to_string(),
        reason,
    };

    let heading_sel = parse_selector("#content h1")?;
    let heading = doc
        .select(&heading_sel)
        .next()
        .map(element_text)
        .ok_or_else(|| shape_err("missing #content h1 heading".to_string()))?;
    let (author, title) = split_heading(&heading).map_err(shape_err)?;

    let genre_sel = parse_selector("span.d_book a")?;
    let genres = doc.select(&genre_sel).map(element_text).collect();

    let comment_sel = parse_selector("div.texts span.black")?;
    let comments = doc.select(&comment_sel).map(element_text).collect();

    let image_sel = parse_selector("div.bookimage img")?;
    let image_url = match doc.select(&image_sel).next() {
        None => None,
        Some(img) => {
            let src = img
                .value()
                .attr("src")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| shape_err("cover image has no src".to_string()))?;
            let resolved = page_url
                .join(src)
                .map_err(|e| shape_err(format!("cover image src {:?}: {}", src, e)))?;
            Some(resolved)
        }
    };

    Ok(BookMetadata {
        title,
        author,
        genres,
        comments,
        image_url,
    })
}

/// Split `Author :: Title` into sanitized `(author, title)`.
fn split_heading(heading: &str) -> Result<(String, String), String> {
    let count = heading.matches(HEADING_SEPARATOR).count();
    if count != 1 {
        return Err(format!(
            "heading {:?} has {} {:?} separators, expected exactly one",
            heading, count, HEADING_SEPARATOR
        ));
    }
    let (author, title) = heading
        .split_once(HEADING_SEPARATOR)
        .ok_or_else(|| format!("heading {:?} has no separator", heading))?;
    let author = sanitize_filename(author);
    let title = sanitize_filename(title);
    if author.is_empty() || title.is_empty() {
        return Err(format!("heading {:?} has an empty author or title", heading));
    }
    Ok((author, title))
}

/// Make `name` safe as a single path component.
///
/// Drops path separators, characters reserved on common filesystems, and control characters;
/// trims surrounding whitespace (including non-breaking spaces) and trailing dots; bounds the
/// result to 255 bytes on a character boundary. Windows device names get a `_` after the stem,
/// so `LPT1.txt` becomes `LPT1_.txt`.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter(|c| !c.is_control())
        .collect();
    let mut out = bound_length(cleaned.trim());
    let stem_len = out.find('.').unwrap_or(out.len());
    if RESERVED_NAMES.contains(&out[..stem_len].to_ascii_uppercase().as_str()) {
        out.insert(stem_len, '_');
        out = bound_length(&out);
    }
    out
}

/// Cut to at most 255 bytes on a character boundary, dropping trailing dots and whitespace.
fn bound_length(name: &str) -> String {
    let mut cut = name.len().min(MAX_FILENAME_BYTES);
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    name[..cut]
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://tululu.org/b239/").expect("static url")
    }

    const DETAIL_PAGE: &str = r#"<html><body>
<div id="content">
  <h1>Кэрролл Льюис &nbsp;::&nbsp; Алиса в Зазеркалье</h1>
  <table class="d_book"><tr><td><div class="bookimage"><a href="/b239/"><img src="/shots/239.jpg" alt="cover"></a></div></td></tr></table>
  <span class="d_book"><b>Жанр книги:</b> <a href="/l55/">Научная фантастика</a>, <a href="/l71/">Сказки</a></span>
  <div class="texts"><b>Гость</b><br><span class="black">Прекрасная книга</span></div>
  <div class="texts"><b>Аноним</b><br><span class="black">Читал в детстве</span></div>
</div>
</body></html>"#;

    #[test]
    fn parses_full_detail_page() -> Result<(), ScraperError> {
        let meta = parse_metadata(DETAIL_PAGE, &page_url())?;
        assert_eq!(meta.author, "Кэрролл Льюис");
        assert_eq!(meta.title, "Алиса в Зазеркалье");
        assert_eq!(meta.genres, ["Научная фантастика", "Сказки"]);
        assert_eq!(meta.comments, ["Прекрасная книга", "Читал в детстве"]);
        assert_eq!(
            meta.image_url.map(|u| u.to_string()).as_deref(),
            Some("https://tululu.org/shots/239.jpg")
        );
        Ok(())
    }

    #[test]
    fn heading_with_non_breaking_spaces_is_trimmed() -> Result<(), String> {
        let (author, title) = split_heading("Jane Doe \u{a0}:: \u{a0} My Book")?;
        assert_eq!(author, "Jane Doe");
        assert_eq!(title, "My Book");
        Ok(())
    }

    #[test]
    fn heading_parts_are_sanitized() -> Result<(), String> {
        let (author, title) = split_heading("A/B \u{a0}::\u{a0} What? Why: \"Because\"")?;
        assert_eq!(author, "AB");
        assert_eq!(title, "What Why Because");
        Ok(())
    }

    #[test]
    fn heading_without_separator_is_shape_error() {
        let html = r#"<div id="content"><h1>Just a title</h1></div>"#;
        assert!(matches!(
            parse_metadata(html, &page_url()),
            Err(ScraperError::MetadataShape { .. })
        ));
    }

    #[test]
    fn heading_with_two_separators_is_shape_error() {
        assert!(split_heading("A :: B :: C").is_err());
    }

    #[test]
    fn empty_heading_part_is_shape_error() {
        assert!(split_heading("  ::  Title").is_err());
        assert!(split_heading("Author :: ???").is_err());
    }

    #[test]
    fn missing_heading_is_shape_error() {
        let html = "<html><body><h1>Author :: Title</h1></body></html>";
        match parse_metadata(html, &page_url()) {
            Err(ScraperError::MetadataShape { url, .. }) => {
                assert_eq!(url, "https://tululu.org/b239/")
            }
            other => panic!("expected MetadataShape, got {:?}", other),
        }
    }

    #[test]
    fn no_genres_no_comments_no_cover() -> Result<(), ScraperError> {
        let html = r#"<div id="content"><h1>Author :: Title</h1></div>"#;
        let meta = parse_metadata(html, &page_url())?;
        assert!(meta.genres.is_empty());
        assert!(meta.comments.is_empty());
        assert!(meta.image_url.is_none());
        Ok(())
    }

    #[test]
    fn cover_without_src_is_shape_error() {
        let html = r#"<div id="content"><h1>Author :: Title</h1><div class="bookimage"><img alt="x"></div></div>"#;
        assert!(matches!(
            parse_metadata(html, &page_url()),
            Err(ScraperError::MetadataShape { .. })
        ));
    }

    #[test]
    fn cover_resolves_against_detail_page_not_site_root() -> Result<(), ScraperError> {
        let html = r#"<div id="content"><h1>A :: T</h1><div class="bookimage"><img src="cover.png"></div></div>"#;
        let meta = parse_metadata(html, &page_url())?;
        assert_eq!(
            meta.image_url.map(|u| u.to_string()).as_deref(),
            Some("https://tululu.org/b239/cover.png")
        );
        Ok(())
    }

    #[test]
    fn sanitize_filename_strips_reserved_characters() {
        assert_eq!(sanitize_filename("fi:le/na*me?.txt"), "filename.txt");
        assert_eq!(sanitize_filename("  padded.. "), "padded");
        assert_eq!(sanitize_filename("tab\there"), "tabhere");
    }

    #[test]
    fn sanitize_filename_suffixes_device_names() {
        assert_eq!(sanitize_filename("con"), "con_");
        assert_eq!(sanitize_filename("LPT1.txt"), "LPT1_.txt");
        assert_eq!(sanitize_filename("aux.tar.gz"), "aux_.tar.gz");
        assert_eq!(sanitize_filename("console"), "console");
    }

    #[test]
    fn sanitize_filename_bounds_length_on_char_boundary() {
        let long = "ж".repeat(200);
        let out = sanitize_filename(&long);
        assert!(out.len() <= MAX_FILENAME_BYTES);
        assert!(out.chars().all(|c| c == 'ж'));
        assert_eq!(out.chars().count(), 127);
    }
}
