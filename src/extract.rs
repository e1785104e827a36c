//! Page metadata extraction.
//!
//! Everything the catalog knows about a page is derived from its HTML:
//!
//! | Field | Source |
//! |-------|--------|
//! | title | `<title>` text |
//! | description, keywords | `meta[name=description]` / `meta[name=keywords]` `content` |
//! | text | plain text of the `[role=main]` region |
//! | photo | `src` of the first `img` inside `[role=main]` |
//! | thumb | derived from photo (see [`thumbnail_for`]) |
//! | location | `address` of the first `[type=map]` element |
//! | language, direction | `lang` / `dir` on `<html>` |
//! | lastModifiedDate | `data-lastmodified` on `<body>` |
//! | template | `data-template` on `<body>` |
//!
//! Missing elements and attributes yield empty values (or `None` where the
//! caller supplies its own fallback). Extraction never fails.
//!
//! ## Thumbnails
//!
//! Thumbnails are not generated here; a thumb is the photo path with a
//! `thumbs/` segment inserted after `files/`. Gallery pages often already
//! reference a thumbnail, so `files/thumbs/a.jpg` stays as it is. Absolute
//! (`http…`) photos live elsewhere and are used as their own thumb.

use crate::dom::{self, Document};
use chrono::{DateTime, FixedOffset, Local, TimeZone};
use std::fmt::Display;

/// Timestamp format stamped on pages and stored in the catalog
/// (`2024-05-01T09:30:00+0200`).
pub const ISO8601: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Selector for the main-content region.
pub const MAIN_SELECTOR: &str = "[role=main]";

/// Selector for the primary photo.
pub const PHOTO_SELECTOR: &str = "[role=main] img";

/// Selector for embedded map markers.
pub const MAP_SELECTOR: &str = "[type=map]";

/// Body attribute holding the last-modified timestamp.
pub const LAST_MODIFIED_ATTR: &str = "data-lastmodified";

/// Body attribute holding the template name.
pub const TEMPLATE_ATTR: &str = "data-template";

/// Metadata read from a page document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub text: String,
    pub photo: String,
    pub thumb: String,
    pub location: String,
    pub language: Option<String>,
    pub direction: Option<String>,
    pub last_modified: Option<String>,
    pub template: Option<String>,
}

/// Read every catalog field from a document.
pub fn extract(doc: &Document) -> PageMetadata {
    let (photo, thumb) = media(doc);
    let html = doc.first("html");
    let body = doc.first("body");

    PageMetadata {
        title: doc
            .first("title")
            .map(|id| doc.text(id))
            .unwrap_or_default(),
        description: meta_content(doc, "description"),
        keywords: meta_content(doc, "keywords"),
        text: main_text(doc),
        photo,
        thumb,
        location: location(doc),
        language: html.and_then(|id| doc.attr(id, "lang")),
        direction: html.and_then(|id| doc.attr(id, "dir")),
        last_modified: body
            .and_then(|id| doc.attr(id, LAST_MODIFIED_ATTR))
            .filter(|s| !s.trim().is_empty()),
        template: body.and_then(|id| doc.attr(id, TEMPLATE_ATTR)),
    }
}

fn meta_content(doc: &Document, name: &str) -> String {
    doc.first(&format!("meta[name={name}]"))
        .and_then(|id| doc.attr(id, "content"))
        .unwrap_or_default()
}

/// Plain-text excerpt of the main-content region; empty without one.
pub fn main_text(doc: &Document) -> String {
    doc.first(MAIN_SELECTOR)
        .map(|id| plain_text(&doc.text(id)))
        .unwrap_or_default()
}

/// Plain-text excerpt of an HTML fragment.
pub fn html_excerpt(fragment: &str) -> String {
    plain_text(&dom::fragment_text(fragment))
}

/// Normalize extracted text: whitespace runs collapse to one space, the
/// ends are trimmed, and control characters are dropped.
pub fn plain_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// First photo in the main region and its thumb; both empty if none.
pub fn media(doc: &Document) -> (String, String) {
    let photo = doc
        .first(PHOTO_SELECTOR)
        .and_then(|id| doc.attr(id, "src"))
        .unwrap_or_default();
    let thumb = thumbnail_for(&photo);
    (photo, thumb)
}

/// Thumbnail reference for a photo reference.
///
/// - `""` → `""`
/// - `http…` → unchanged
/// - `files/a.jpg` → `files/thumbs/a.jpg`
/// - `files/thumbs/a.jpg` → `files/thumbs/a.jpg`
pub fn thumbnail_for(photo: &str) -> String {
    if photo.is_empty() {
        return String::new();
    }
    if photo.starts_with("http") {
        return photo.to_string();
    }
    photo
        .replace("files/", "files/thumbs/")
        .replace("thumbs/thumbs/", "thumbs/")
}

/// Address of the first map marker; empty if there is none.
pub fn location(doc: &Document) -> String {
    doc.first(MAP_SELECTOR)
        .and_then(|id| doc.attr(id, "address"))
        .unwrap_or_default()
}

/// Stamp the body with a last-modified timestamp and, when given, the
/// template name.
pub fn stamp(doc: &mut Document, timestamp: &str, template: Option<&str>) {
    if let Some(body) = doc.first("body") {
        doc.set_attr(body, LAST_MODIFIED_ATTR, timestamp);
        if let Some(template) = template {
            doc.set_attr(body, TEMPLATE_ATTR, template);
        }
    }
}

/// Current local time in [`ISO8601`] format.
pub fn timestamp_now() -> String {
    format_timestamp(&Local::now())
}

pub fn format_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    time.format(ISO8601).to_string()
}

/// Parse a stored timestamp. RFC 3339 (`+02:00` offsets) is accepted too.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    DateTime::parse_from_str(value, ISO8601)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="fr" dir="ltr">
<head>
  <title>T</title>
  <meta name="description" content="D">
  <meta name="keywords" content="k1, k2">
</head>
<body data-lastmodified="2024-05-01T09:30:00+0200" data-template="default">
  <nav><img src="files/logo.png"></nav>
  <main role="main">
    <img src="files/a.jpg">
    <p>Hello   world</p>
    <div type="map" address="1 Main St, Springfield"></div>
  </main>
</body>
</html>"#;

    #[test]
    fn extracts_all_fields() {
        let meta = extract(&Document::parse(PAGE));
        assert_eq!(meta.title, "T");
        assert_eq!(meta.description, "D");
        assert_eq!(meta.keywords, "k1, k2");
        assert_eq!(meta.text, "Hello world");
        assert_eq!(meta.photo, "files/a.jpg");
        assert_eq!(meta.thumb, "files/thumbs/a.jpg");
        assert_eq!(meta.location, "1 Main St, Springfield");
        assert_eq!(meta.language.as_deref(), Some("fr"));
        assert_eq!(meta.direction.as_deref(), Some("ltr"));
        assert_eq!(
            meta.last_modified.as_deref(),
            Some("2024-05-01T09:30:00+0200")
        );
        assert_eq!(meta.template.as_deref(), Some("default"));
    }

    #[test]
    fn missing_elements_yield_empty_values() {
        let meta = extract(&Document::parse("<p>bare</p>"));
        assert_eq!(meta.title, "");
        assert_eq!(meta.description, "");
        assert_eq!(meta.text, "");
        assert_eq!(meta.photo, "");
        assert_eq!(meta.thumb, "");
        assert_eq!(meta.location, "");
        assert_eq!(meta.language, None);
        assert_eq!(meta.last_modified, None);
        assert_eq!(meta.template, None);
    }

    #[test]
    fn photo_outside_main_is_ignored() {
        let doc = Document::parse(r#"<body><img src="files/x.jpg"><div role="main">t</div></body>"#);
        assert_eq!(media(&doc), (String::new(), String::new()));
    }

    #[test]
    fn map_without_address_is_empty() {
        let doc = Document::parse(r#"<div role="main"><div type="map"></div></div>"#);
        assert_eq!(location(&doc), "");
    }

    #[test]
    fn thumbnail_inserts_thumbs_segment() {
        assert_eq!(thumbnail_for("files/a.jpg"), "files/thumbs/a.jpg");
        assert_eq!(thumbnail_for("../files/gallery/b.png"), "../files/thumbs/gallery/b.png");
    }

    #[test]
    fn thumbnail_is_idempotent() {
        assert_eq!(thumbnail_for("files/thumbs/a.jpg"), "files/thumbs/a.jpg");
        let once = thumbnail_for("files/a.jpg");
        assert_eq!(thumbnail_for(&once), once);
    }

    #[test]
    fn thumbnail_passes_absolute_photos_through() {
        let photo = "https://cdn.example.com/files/a.jpg";
        assert_eq!(thumbnail_for(photo), photo);
    }

    #[test]
    fn thumbnail_of_nothing_is_nothing() {
        assert_eq!(thumbnail_for(""), "");
    }

    #[test]
    fn plain_text_collapses_and_trims() {
        assert_eq!(plain_text("  Hello \n\t  world  "), "Hello world");
        assert_eq!(plain_text("a\u{7}b"), "ab");
        assert_eq!(plain_text("café  crème"), "café crème");
    }

    #[test]
    fn html_excerpt_strips_markup() {
        assert_eq!(
            html_excerpt("<h1>Welcome</h1>\n<p>to   the <b>site</b></p>"),
            "Welcome to the site"
        );
    }

    #[test]
    fn stamp_sets_body_attributes() {
        let mut doc = Document::parse("<html><body></body></html>");
        stamp(&mut doc, "2024-01-01T00:00:00+0000", Some("blog"));
        let meta = extract(&doc);
        assert_eq!(meta.last_modified.as_deref(), Some("2024-01-01T00:00:00+0000"));
        assert_eq!(meta.template.as_deref(), Some("blog"));
    }

    #[test]
    fn stamp_without_template_keeps_existing() {
        let mut doc = Document::parse(r#"<html><body data-template="old"></body></html>"#);
        stamp(&mut doc, "2024-01-01T00:00:00+0000", None);
        assert_eq!(extract(&doc).template.as_deref(), Some("old"));
    }

    #[test]
    fn timestamp_round_trip() {
        let stamp = timestamp_now();
        let parsed = parse_timestamp(&stamp).unwrap();
        assert_eq!(format_timestamp(&parsed), stamp);
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339() {
        let a = parse_timestamp("2024-05-01T09:30:00+0200").unwrap();
        let b = parse_timestamp("2024-05-01T09:30:00+02:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_timestamp("yesterday").is_none());
    }
}
