//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each page leads
//! with its positional index and title; its URL follows the arrow, and
//! catalog details are shown as indented context lines.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Pages (2)
//! 001 About → about
//!     Modified: 2024-05-01T09:30:00+0200 by ada@example.com
//!     Template: default
//!     Text: We make things...
//! 002 (untitled) → blog/draft
//!     Modified: 2024-04-02T10:00:00+0200
//! ```
//!
//! ## Rebuild / remove
//!
//! ```text
//! Rebuilt catalog for portfolio: 12 pages
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::types::Page;

/// Excerpts longer than this are cut in listings.
const TEXT_PREVIEW: usize = 60;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// `001 About → about`; pages without a title show `(untitled)`.
fn page_header(index: usize, page: &Page) -> String {
    let title = if page.title.is_empty() {
        "(untitled)"
    } else {
        page.title.as_str()
    };
    format!("{} {} → {}", format_index(index), title, page.url)
}

fn modified_line(page: &Page) -> String {
    if page.last_modified_by.is_empty() {
        format!("Modified: {}", page.last_modified_date)
    } else {
        format!(
            "Modified: {} by {}",
            page.last_modified_date, page.last_modified_by
        )
    }
}

// ============================================================================
// Listing
// ============================================================================

/// Format a page listing in the given order.
pub fn format_page_list(pages: &[Page]) -> Vec<String> {
    let mut lines = vec![format!("Pages ({})", pages.len())];
    let ctx = indent(1);

    for (i, page) in pages.iter().enumerate() {
        lines.push(page_header(i + 1, page));
        lines.push(format!("{ctx}{}", modified_line(page)));
        if !page.template.is_empty() {
            lines.push(format!("{ctx}Template: {}", page.template));
        }
        if !page.photo.is_empty() {
            lines.push(format!("{ctx}Photo: {}", page.photo));
        }
        if !page.text.is_empty() {
            lines.push(format!("{ctx}Text: {}", truncate(&page.text, TEXT_PREVIEW)));
        }
    }
    lines
}

pub fn print_page_list(pages: &[Page]) {
    for line in format_page_list(pages) {
        println!("{}", line);
    }
}

/// Format every catalog field of one page.
pub fn format_page_detail(page: &Page) -> Vec<String> {
    let ctx = indent(1);
    let fields = [
        ("Title", &page.title),
        ("Description", &page.description),
        ("Keywords", &page.keywords),
        ("Callout", &page.callout),
        ("Photo", &page.photo),
        ("Thumb", &page.thumb),
        ("Location", &page.location),
        ("Language", &page.language),
        ("Direction", &page.direction),
        ("Template", &page.template),
        ("Modified", &page.last_modified_date),
        ("Modified by", &page.last_modified_by),
        ("Text", &page.text),
    ];

    let mut lines = vec![page.url.clone()];
    lines.extend(
        fields
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(label, value)| format!("{ctx}{label}: {value}")),
    );
    lines
}

pub fn print_page_detail(page: &Page) {
    for line in format_page_detail(page) {
        println!("{}", line);
    }
}

// ============================================================================
// Mutations
// ============================================================================

pub fn format_rebuild_summary(site_id: &str, pages: &[Page]) -> Vec<String> {
    let noun = if pages.len() == 1 { "page" } else { "pages" };
    vec![format!(
        "Rebuilt catalog for {}: {} {}",
        site_id,
        pages.len(),
        noun
    )]
}

pub fn print_rebuild_summary(site_id: &str, pages: &[Page]) {
    for line in format_rebuild_summary(site_id, pages) {
        println!("{}", line);
    }
}

/// Result line for a created page; notes when the URL was deduplicated.
pub fn format_created(requested: &str, page: &Page) -> Vec<String> {
    let mut lines = vec![format!("Created {} → {}.html", page.url, page.url)];
    if page.url != requested {
        lines.push(format!("{}Requested: {}", indent(1), requested));
    }
    if !page.template.is_empty() {
        lines.push(format!("{}Template: {}", indent(1), page.template));
    }
    lines
}

pub fn print_created(requested: &str, page: &Page) {
    for line in format_created(requested, page) {
        println!("{}", line);
    }
}
