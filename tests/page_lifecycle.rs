//! End-to-end page lifecycle against a site on disk.
//!
//! Builds a site in a temp directory, then drives it through the public
//! API: rebuild, add, edit, settings, list, and remove. Each step checks
//! both the page file and the catalog.

use respond_pages::dom::Document;
use respond_pages::{catalog, extract, pages};
use respond_pages::site::{Site, User};
use respond_pages::types::{Change, Page, PageSettings};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en" dir="ltr">
<head>
<base href="/">
<title>{{page.title}}</title>
<meta name="description" content="{{page.description}}">
<meta name="keywords" content="">
</head>
<body>
<main role="main"><h1>{{page.title}}</h1>
<p>Start writing.</p></main>
</body>
</html>"#;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn setup() -> (TempDir, Site, User) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("portfolio");
    write(&root, "templates/default.html", TEMPLATE);
    write(
        &root,
        "index.html",
        &TEMPLATE
            .replace("{{page.title}}", "Home")
            .replace("{{page.description}}", "Welcome")
            .replace("<body>", r#"<body data-lastmodified="2020-01-01T00:00:00+0000">"#),
    );
    write(&root, "fragments/page/about.html", "<p>reserved</p>");
    write(&root, ".default.html", "<p>legacy</p>");
    write(
        &root,
        "config.toml",
        "[settings]\namp = \"true\"\n\n[user]\nemail = \"site@example.com\"\n",
    );

    let (site, config) = Site::open(tmp.path(), "portfolio").unwrap();
    let user = User::from(&config.user);
    (tmp, site, user)
}

fn urls(pages: &[Page]) -> Vec<&str> {
    pages.iter().map(|p| p.url.as_str()).collect()
}

#[test]
fn full_page_lifecycle() {
    let (tmp, site, user) = setup();
    assert!(site.amp_enabled());
    assert_eq!(user.email, "site@example.com");

    // Rebuild picks up the existing page only.
    let pages_on_disk = catalog::refresh(&site, &user).unwrap();
    assert_eq!(urls(&pages_on_disk), vec!["index"]);
    assert_eq!(pages_on_disk[0].title, "Home");
    assert_eq!(pages_on_disk[0].template, "default");

    // "about" is reserved by a fragment, so the page lands on about1.
    let draft = Page::draft("about", "About Us", "Who we are");
    let added = pages::add(&draft, &site, &user, None).unwrap();
    assert_eq!(added.url, "about1");
    assert_eq!(added.text, "About Us Start writing.");
    assert_eq!(
        urls(&catalog::list_all_by_site(tmp.path(), "portfolio")),
        vec!["index", "about1"]
    );

    // Edit the main region; excerpt, photo, and AMP copy follow.
    let changes = [Change::new(
        "[role=main]",
        r#"<h1>About</h1>
<img src="files/team.jpg" style="border:0">
<div type="map" address="1 Main St"></div>"#,
    )];
    assert!(pages::edit("about1", &changes, &site, &user).unwrap());

    let entry = catalog::get_by_url(&site, "about1.html").unwrap();
    assert_eq!(entry.text, "About");
    assert_eq!(entry.photo, "files/team.jpg");
    assert_eq!(entry.thumb, "files/thumbs/team.jpg");
    assert_eq!(entry.location, "1 Main St");
    assert_eq!(entry.last_modified_by, "site@example.com");

    let amp = fs::read_to_string(site.amp_file("about1")).unwrap();
    assert!(amp.contains("<amp-img "));
    assert!(!amp.contains("style="));

    // Settings rewrite the title in the file and the catalog.
    let settings = PageSettings {
        title: "About the Team".into(),
        description: "People".into(),
        language: "fr".into(),
        direction: "ltr".into(),
        ..PageSettings::default()
    };
    assert!(pages::edit_settings("about1", &settings, &site, &user).unwrap());
    let html = fs::read_to_string(site.page_file("about1")).unwrap();
    let meta = extract::extract(&Document::parse(&html));
    assert_eq!(meta.title, "About the Team");
    assert_eq!(meta.description, "People");
    assert_eq!(meta.language.as_deref(), Some("fr"));

    // The most recently saved page lists first; AMP copies are not pages.
    let listed = catalog::list_all(&site, &user).unwrap();
    assert_eq!(urls(&listed)[0], "about1");
    assert_eq!(listed.len(), 2);

    // Remove deletes the file and its AMP copy, then rebuilds.
    let remaining = pages::remove("about1", &site, &user).unwrap();
    assert_eq!(urls(&remaining), vec!["index"]);
    assert!(!site.page_file("about1").exists());
    assert!(!site.amp_file("about1").exists());
}

#[test]
fn nested_page_gets_relative_base_href() {
    let (_tmp, site, user) = setup();
    catalog::refresh(&site, &user).unwrap();

    let added = pages::add(&Page::draft("blog/2024/hello", "Hello", ""), &site, &user, None).unwrap();
    assert_eq!(added.url, "blog/2024/hello");

    let doc = Document::parse(&fs::read_to_string(site.page_file(&added.url)).unwrap());
    let base = doc.first("base").unwrap();
    assert_eq!(doc.attr(base, "href").as_deref(), Some("../../"));
}

#[test]
fn listing_without_friendly_urls_appends_html() {
    let (_tmp, mut site, user) = setup();
    site.supports_friendly_urls = false;

    // No catalog yet: listing rebuilds it.
    let listed = catalog::list_all(&site, &user).unwrap();
    assert_eq!(urls(&listed), vec!["index.html"]);
    assert!(site.catalog_file().exists());

    // The stored catalog keeps bare URLs.
    assert!(catalog::get_by_url(&site, "index").is_some());
}
