//! Page operations: create, edit, save, and remove pages of a site.
//!
//! Every operation keeps two representations in step: the page file
//! (`<site>/<url>.html`, the source of truth) and its catalog entry in
//! `data/pages.json`.
//!
//! ```text
//! add            template ─► stamp ─► <url>.html ─► append entry
//! edit           changes  ─► <url>.html ─► excerpt ─► save
//! edit_settings  settings ─► save
//! save           Page ─► <url>.html (title, meta, lang/dir, stamp) ─► update entry ─► amplify
//! remove         delete <url>.html ─► rebuild catalog
//! ```
//!
//! Lookups go through the catalog: a page missing from the catalog cannot
//! be edited, and `edit`/`edit_settings` report that as `Ok(false)`.
//! Missing elements are tolerated everywhere. Only failures to write files
//! are errors.

use crate::amp::{AmpConverter, BasicAmpConverter};
use crate::catalog::{self, Catalog, CatalogError};
use crate::dom::Document;
use crate::extract::{self, MAIN_SELECTOR};
use crate::site::{Site, User};
use crate::slug;
use crate::types::{Change, Page, PageSettings};
use maud::{DOCTYPE, html};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

const TITLE_PLACEHOLDER: &str = "{{page.title}}";
const DESCRIPTION_PLACEHOLDER: &str = "{{page.description}}";

/// Document used for new pages when a site has neither a template nor
/// legacy default content.
pub fn placeholder_document() -> String {
    html! {
        (DOCTYPE)
        html {
            head {
                title { (TITLE_PLACEHOLDER) }
                meta name="description" content=(DESCRIPTION_PLACEHOLDER);
            }
            body {
                div role="main" {
                    p { "You must specify default content in .default.html" }
                }
            }
        }
    }
    .into_string()
}

/// Source for a new page and the template name it records.
///
/// Tries `templates/<name>.html`, then the legacy `.default.html` (which
/// records no template), then [`placeholder_document`].
pub fn load_template(site: &Site, name: &str) -> (String, String) {
    if !name.is_empty() {
        if let Ok(source) = fs::read_to_string(site.template_file(name)) {
            return (source, name.to_string());
        }
        debug!("Template '{}' not found for site {}", name, site.id);
    }
    match fs::read_to_string(site.legacy_default_file()) {
        Ok(source) => (source, String::new()),
        Err(_) => (placeholder_document(), String::new()),
    }
}

// =============================================================================
// Add
// =============================================================================

/// Create a page from a draft.
///
/// The draft's URL is only a request: if its fragment or page file already
/// exists, the first free `<url>1`, `<url>2`, … is used instead. The page is
/// built from `content` when given, otherwise from the draft's template
/// (falling back to the site default). The returned page carries the final
/// URL and template.
///
/// The entry is appended to the catalog only if the catalog exists.
pub fn add(
    draft: &Page,
    site: &Site,
    user: &User,
    content: Option<&str>,
) -> Result<Page, PageError> {
    let requested = draft.url.trim_matches('/');
    let requested = slug::fragment_name(requested.strip_suffix(".html").unwrap_or(requested));
    let name = slug::dedup_name(&requested, |candidate| {
        let taken = site.fragment_file(candidate).exists()
            || site
                .page_file(&slug::url_from_fragment_name(candidate))
                .exists();
        if taken {
            debug!("Page name '{}' is taken", candidate);
        }
        taken
    });
    let url = slug::url_from_fragment_name(&name);

    let template_name = if draft.template.is_empty() {
        site.default_template.as_str()
    } else {
        draft.template.as_str()
    };
    let (source, template) = match content {
        Some(content) => (content.to_string(), template_name.to_string()),
        None => load_template(site, template_name),
    };
    let source = source
        .replace(TITLE_PLACEHOLDER, &draft.title)
        .replace(DESCRIPTION_PLACEHOLDER, &draft.description);

    let timestamp = extract::timestamp_now();
    let mut doc = Document::parse(&source);
    extract::stamp(&mut doc, &timestamp, Some(&template));
    if let Some(base) = doc.first("base") {
        doc.set_attr(base, "href", slug::base_href(&url));
    }
    write_file(&site.page_file(&url), &doc.to_html())?;

    let meta = extract::extract(&doc);
    let page = Page {
        title: draft.title.clone(),
        description: draft.description.clone(),
        text: meta.text,
        keywords: draft.keywords.clone(),
        callout: draft.callout.clone(),
        url,
        photo: meta.photo,
        thumb: meta.thumb,
        location: meta.location,
        language: first_non_empty(&draft.language, meta.language, &site.language),
        direction: first_non_empty(&draft.direction, meta.direction, &site.direction),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        last_modified_by: user.email.clone(),
        last_modified_date: timestamp,
        template,
    };

    match Catalog::load(&site.catalog_file()) {
        Some(mut catalog) => {
            catalog.pages.push(page.clone());
            catalog.save(&site.catalog_file())?;
        }
        None => warn!(
            "Site {} has no catalog; page '{}' was not catalogued",
            site.id, page.url
        ),
    }

    info!(site = %site.id, url = %page.url, "Created page");
    Ok(page)
}

fn first_non_empty(requested: &str, found: Option<String>, fallback: &str) -> String {
    if !requested.is_empty() {
        return requested.to_string();
    }
    found
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

// =============================================================================
// Edit
// =============================================================================

/// Apply content changes to a page, then [`save`] it.
///
/// Each change replaces the inner HTML of the first element matching its
/// selector, in order; later changes see earlier ones. The excerpt is
/// taken from the last change targeting `[role=main]`; without one the
/// catalogued excerpt is kept.
///
/// Returns `Ok(false)` when the page is not catalogued or its file is
/// missing.
pub fn edit(url: &str, changes: &[Change], site: &Site, user: &User) -> Result<bool, PageError> {
    let Some(mut page) = catalog::get_by_url(site, url) else {
        debug!("Page '{}' is not in the catalog of {}", url, site.id);
        return Ok(false);
    };
    let path = site.page_file(&page.url);
    let Ok(source) = fs::read_to_string(&path) else {
        debug!("Page file {} is missing", path.display());
        return Ok(false);
    };

    let mut doc = Document::parse(&source);
    let mut main_html = None;
    for change in changes {
        match doc.first(&change.selector) {
            Some(id) => doc.set_inner_html(id, change.html.as_str()),
            None => debug!("No element matches '{}' in {}", change.selector, page.url),
        }
        if change.targets_main() {
            main_html = Some(change.html.as_str());
        }
    }
    write_file(&path, &doc.to_html())?;

    if let Some(html) = main_html {
        page.text = extract::html_excerpt(html);
    }
    save(&mut page, site, user)?;
    Ok(true)
}

/// Replace a page's display metadata, then [`save`] it.
///
/// Returns `Ok(false)` when the page is not catalogued.
pub fn edit_settings(
    url: &str,
    settings: &PageSettings,
    site: &Site,
    user: &User,
) -> Result<bool, PageError> {
    let Some(mut page) = catalog::get_by_url(site, url) else {
        return Ok(false);
    };
    page.title = settings.title.clone();
    page.description = settings.description.clone();
    page.keywords = settings.keywords.clone();
    page.callout = settings.callout.clone();
    page.language = settings.language.clone();
    page.direction = settings.direction.clone();
    save(&mut page, site, user)?;
    Ok(true)
}

// =============================================================================
// Save
// =============================================================================

/// Write a page's metadata into its file and catalog entry.
///
/// When the page file has content, its `<title>`, description and keywords
/// meta tags, and `lang`/`dir` are set from `page`, the body is stamped,
/// and photo, thumb, and location are re-derived from the markup into
/// `page`. The catalog entry with the page's URL is then updated whether or
/// not the file existed; nothing is added when there is no such entry.
pub fn save(page: &mut Page, site: &Site, user: &User) -> Result<(), PageError> {
    let path = site.page_file(&page.url);
    let timestamp = extract::timestamp_now();
    let source = fs::read_to_string(&path).unwrap_or_default();

    let written = !source.trim().is_empty();
    if written {
        let mut doc = Document::parse(&source);
        apply_metadata(&mut doc, page);

        let (photo, thumb) = extract::media(&doc);
        page.photo = photo;
        page.thumb = thumb;
        page.location = extract::location(&doc);

        extract::stamp(&mut doc, &timestamp, Some(&page.template));
        write_file(&path, &doc.to_html())?;
    }

    page.last_modified_by = user.email.clone();
    page.last_modified_date = timestamp;

    match Catalog::load(&site.catalog_file()) {
        Some(mut catalog) => {
            if catalog.update(page) == 0 {
                warn!("Page '{}' has no catalog entry in {}", page.url, site.id);
            } else {
                catalog.save(&site.catalog_file())?;
            }
        }
        None => warn!("Site {} has no catalog to update", site.id),
    }

    if written {
        amplify(page, site, &BasicAmpConverter)?;
    }
    info!(site = %site.id, url = %page.url, "Saved page");
    Ok(())
}

fn apply_metadata(doc: &mut Document, page: &Page) {
    if let Some(title) = doc.first("title") {
        doc.set_inner_text(title, &page.title);
    }
    for (name, value) in [
        ("description", &page.description),
        ("keywords", &page.keywords),
    ] {
        if let Some(meta) = doc.first(&format!("meta[name={name}]")) {
            doc.set_attr(meta, "content", value.as_str());
        }
    }
    if let Some(root) = doc.first("html") {
        if !page.language.is_empty() {
            doc.set_attr(root, "lang", page.language.as_str());
        }
        if !page.direction.is_empty() {
            doc.set_attr(root, "dir", page.direction.as_str());
        }
    }
}

// =============================================================================
// Remove
// =============================================================================

/// Delete a page file (and its AMP copy), then rebuild the catalog.
///
/// Returns the rebuilt catalog. Removing a page that doesn't exist only
/// rebuilds.
pub fn remove(url: &str, site: &Site, user: &User) -> Result<Vec<Page>, PageError> {
    let url = slug::strip_extension(url.trim_matches('/'));
    for path in [site.page_file(url), site.amp_file(url)] {
        if path.exists() {
            fs::remove_file(&path)?;
            debug!("Removed {}", path.display());
        }
    }
    info!(site = %site.id, url = %url, "Removed page");
    Ok(catalog::refresh(site, user)?)
}

// =============================================================================
// AMP
// =============================================================================

/// Write the AMP copy of a page when the site enables it.
///
/// Returns whether a copy was written. Pages without a main region get none.
pub fn amplify(page: &Page, site: &Site, converter: &dyn AmpConverter) -> Result<bool, PageError> {
    if !site.amp_enabled() {
        return Ok(false);
    }
    let Ok(source) = fs::read_to_string(site.page_file(&page.url)) else {
        return Ok(false);
    };
    let doc = Document::parse(&source);
    let Some(main) = doc.first(MAIN_SELECTOR) else {
        debug!("Page '{}' has no main region; no AMP copy", page.url);
        return Ok(false);
    };

    let amp = converter.convert(&doc.inner_html(main));
    write_file(&site.amp_file(&page.url), &amp)?;
    debug!("Wrote AMP copy of '{}'", page.url);
    Ok(true)
}

fn write_file(path: &Path, content: &str) -> Result<(), PageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
