//! Shared test utilities for the respond-pages test suite.
//!
//! Provides a temporary site fixture, page lookups that panic with the
//! available URLs on a miss, and a small page-markup builder.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let fx = SiteFixture::new();
//! fx.write("about.html", &page_html("About", "Who we are", "<p>Hi</p>"));
//!
//! let pages = catalog::refresh(&fx.site, &test_user()).unwrap();
//! assert_eq!(find_page(&pages, "about").title, "About");
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::catalog::Catalog;
use crate::site::{Site, User};
use crate::types::Page;

// =========================================================================
// Fixture setup
// =========================================================================

/// A site named `test` inside a temporary sites root.
pub struct SiteFixture {
    pub site: Site,
    tmp: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let site = Site::new("test", tmp.path().join("test"));
        fs::create_dir_all(&site.root).unwrap();
        Self { site, tmp }
    }

    pub fn sites_root(&self) -> &Path {
        self.tmp.path()
    }

    /// Write a file relative to the site root, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.site.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Read a file relative to the site root. Panics if missing.
    pub fn read(&self, relative: &str) -> String {
        let path = self.site.root.join(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.site.root.join(relative).exists()
    }

    pub fn write_catalog(&self, pages: &[Page]) {
        Catalog {
            pages: pages.to_vec(),
        }
        .save(&self.site.catalog_file())
        .unwrap();
    }

    /// Current catalog entries. Panics if the catalog is missing.
    pub fn read_catalog(&self) -> Vec<Page> {
        Catalog::load(&self.site.catalog_file())
            .expect("catalog should exist")
            .pages
    }

    /// Mark a fragment name as taken.
    pub fn write_fragment(&self, name: &str) {
        self.write(&format!("fragments/page/{name}.html"), "<p>fragment</p>");
    }

    pub fn write_template(&self, name: &str, content: &str) {
        self.write(&format!("templates/{name}.html"), content);
    }
}

pub fn test_user() -> User {
    User::new("Ada", "Lovelace", "ada@example.com")
}

/// A complete page with a title, a description, and the given main region.
pub fn page_html(title: &str, description: &str, main: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>{title}</title>
<meta name="description" content="{description}">
<meta name="keywords" content="">
</head>
<body>
<div role="main">{main}</div>
</body>
</html>"#
    )
}

// =========================================================================
// Page lookups: panic with a clear message on miss
// =========================================================================

/// Find a page by URL. Panics if not found.
pub fn find_page<'a>(pages: &'a [Page], url: &str) -> &'a Page {
    pages.iter().find(|p| p.url == url).unwrap_or_else(|| {
        let urls = page_urls(pages);
        panic!("page '{url}' not found. Available: {urls:?}")
    })
}

/// All page URLs in list order.
pub fn page_urls(pages: &[Page]) -> Vec<&str> {
    pages.iter().map(|p| p.url.as_str()).collect()
}
