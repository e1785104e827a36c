//! The per-site page catalog.
//!
//! The catalog is a JSON array of [`Page`] records at
//! `<site>/data/pages.json`. It is a read-optimized cache of metadata
//! extracted from the page files: the HTML is the source of truth and the
//! whole catalog can be rebuilt from disk at any time with [`refresh`].
//!
//! # Reads degrade, writes fail
//!
//! A missing, unreadable, or corrupt catalog loads as `None`; callers
//! decide whether that means "rebuild" ([`list_all`]) or "nothing found"
//! ([`get_by_url`]). Failing to *write* the catalog is an error.
//!
//! # Writers
//!
//! Every mutation rewrites the whole file. Writes go to a temporary file in
//! `data/` that is then renamed over the catalog, so readers never see a
//! half-written array. There is no locking: one writer per site at a time
//! is assumed, and two concurrent writers lose one of their updates.
//!
//! # Rebuild
//!
//! [`refresh`] walks the site root for `.html` files, skipping the
//! infrastructure directories in [`EXCLUDED_DIRS`], AMP copies
//! (`*-amp.html`), and reserved `.default` pages. Files are parsed in
//! parallel; the catalog keeps file-name order. Every rebuilt entry is
//! attributed to the user running the rebuild, since page files carry no
//! author information.

use crate::dom::Document;
use crate::extract;
use crate::site::{self, Site, User};
use crate::slug;
use crate::types::Page;
use chrono::{DateTime, Local};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level site directories that never contain pages.
pub const EXCLUDED_DIRS: &[&str] = &[
    "plugins",
    "components",
    "templates",
    "css",
    "data",
    "files",
    "js",
    "locales",
    "fragments",
    "themes",
];

/// In-memory catalog, serialized as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub pages: Vec<Page>,
}

impl Catalog {
    /// Load a catalog file. Returns `None` if it doesn't exist or can't be
    /// read or parsed.
    pub fn load(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                warn!("Ignoring unreadable catalog {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write the catalog as pretty-printed JSON, replacing the file atomically.
    ///
    /// The replacement keeps the permissions of the file it replaces. A new
    /// catalog gets 0644 on unix, like the page files next to it.
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let dir = path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(self)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::metadata(path)
                .map(|meta| meta.permissions())
                .unwrap_or_else(|_| fs::Permissions::from_mode(0o644));
            tmp.as_file().set_permissions(permissions)?;
        }
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// First entry with the given URL.
    pub fn find(&self, url: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.url == url)
    }

    /// Copy derived fields from `page` into every entry with its URL.
    ///
    /// Identity and author name fields are left alone. Returns the number
    /// of entries updated; no entry is added when nothing matches.
    pub fn update(&mut self, page: &Page) -> usize {
        let mut updated = 0;
        for entry in self.pages.iter_mut().filter(|p| p.url == page.url) {
            entry.title = page.title.clone();
            entry.description = page.description.clone();
            entry.text = page.text.clone();
            entry.keywords = page.keywords.clone();
            entry.callout = page.callout.clone();
            entry.photo = page.photo.clone();
            entry.thumb = page.thumb.clone();
            entry.location = page.location.clone();
            entry.language = page.language.clone();
            entry.direction = page.direction.clone();
            entry.last_modified_by = page.last_modified_by.clone();
            entry.last_modified_date = page.last_modified_date.clone();
            entry.template = page.template.clone();
            updated += 1;
        }
        updated
    }
}

// =============================================================================
// Rebuild
// =============================================================================

/// Rebuild the site catalog from the page files and write it.
pub fn refresh(site: &Site, user: &User) -> Result<Vec<Page>, CatalogError> {
    let files = page_files(&site.root);
    let pages: Vec<Page> = files
        .par_iter()
        .map(|rel| read_page(site, rel, user))
        .filter(|page| !slug::is_reserved(&page.url))
        .collect();

    let catalog = Catalog { pages };
    catalog.save(&site.catalog_file())?;
    info!(
        site = %site.id,
        pages = catalog.pages.len(),
        "Rebuilt page catalog"
    );
    Ok(catalog.pages)
}

/// Page files under a site root, relative to it, in file-name order.
pub fn page_files(site_root: &Path) -> Vec<PathBuf> {
    WalkDir::new(site_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_page_file(entry.path()))
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(site_root)
                .ok()
                .map(Path::to_path_buf)
        })
        .collect()
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    let excluded = entry.depth() == 1
        && entry.file_type().is_dir()
        && EXCLUDED_DIRS.contains(&entry.file_name().to_string_lossy().as_ref());
    if excluded {
        debug!("Skipping {}", entry.path().display());
    }
    excluded
}

fn is_page_file(path: &Path) -> bool {
    let is_html = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("html"))
        .unwrap_or(false);
    let is_amp = path
        .file_name()
        .map(|n| n.to_string_lossy().ends_with("-amp.html"))
        .unwrap_or(false);
    is_html && !is_amp
}

/// Build a catalog entry from one page file (path relative to the site root).
///
/// The timestamp comes from the body stamp, falling back to the file's
/// modification time. The template comes from the body stamp, falling back
/// to the site's default template when that template exists.
pub fn read_page(site: &Site, relative: &Path, user: &User) -> Page {
    let path = site.root.join(relative);
    let source = fs::read_to_string(&path).unwrap_or_default();
    let meta = extract::extract(&Document::parse(&source));

    let last_modified_date = meta
        .last_modified
        .unwrap_or_else(|| modified_time(&path));
    let template = meta.template.unwrap_or_else(|| {
        if site.template_file(&site.default_template).exists() {
            site.default_template.clone()
        } else {
            String::new()
        }
    });

    Page {
        title: meta.title,
        description: meta.description,
        text: meta.text,
        keywords: meta.keywords,
        callout: String::new(),
        url: slug::url_from_path(relative),
        photo: meta.photo,
        thumb: meta.thumb,
        location: meta.location,
        language: meta.language.unwrap_or_else(|| site.language.clone()),
        direction: meta.direction.unwrap_or_else(|| site.direction.clone()),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        last_modified_by: user.email.clone(),
        last_modified_date,
        template,
    }
}

fn modified_time(path: &Path) -> String {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| extract::format_timestamp(&DateTime::<Local>::from(t)))
        .unwrap_or_else(|_: io::Error| extract::timestamp_now())
}

// =============================================================================
// Lookup and listing
// =============================================================================

/// Look up a page by URL. A trailing extension (`about.html`) is ignored.
///
/// Never rebuilds; a missing catalog finds nothing.
pub fn get_by_url(site: &Site, url: &str) -> Option<Page> {
    let url = slug::strip_extension(url);
    Catalog::load(&site.catalog_file())?.find(url).cloned()
}

/// All pages of a site, newest first.
///
/// Rebuilds the catalog if it is missing. Sites without friendly URLs get
/// `.html` appended to every URL.
pub fn list_all(site: &Site, user: &User) -> Result<Vec<Page>, CatalogError> {
    let mut pages = match Catalog::load(&site.catalog_file()) {
        Some(catalog) => catalog.pages,
        None => refresh(site, user)?,
    };

    if !site.supports_friendly_urls {
        for page in &mut pages {
            page.url.push_str(".html");
        }
    }

    pages.sort_by_key(|page| Reverse(sort_timestamp(&page.last_modified_date)));
    Ok(pages)
}

/// Raw catalog of a site by id: no rebuild, no URL rewriting, no sorting.
pub fn list_all_by_site(sites_root: &Path, site_id: &str) -> Vec<Page> {
    Catalog::load(&site::catalog_path(&sites_root.join(site_id)))
        .map(|catalog| catalog.pages)
        .unwrap_or_default()
}

/// Unparseable dates sort as the epoch.
fn sort_timestamp(value: &str) -> i64 {
    extract::parse_timestamp(value)
        .map(|t| t.timestamp())
        .unwrap_or(0)
}
