//! Page URL conventions.
//!
//! A page URL is a site-relative path without extension (`blog/hello`).
//! Several on-disk names derive from it:
//!
//! - **Fragment name**: the URL with `/` replaced by `.` (`blog.hello`),
//!   used for `fragments/page/<name>.html`. An existing fragment marks the
//!   slug as taken.
//! - **Page file**: `<url>.html` under the site root.
//! - **Base href**: one `../` per directory level, so relative links in a
//!   nested page still resolve against the site root.
//!
//! URLs starting with `.default` are reserved for the legacy default
//! content file and never appear in a catalog.

use std::path::Path;

/// Reserved prefix for legacy default-content files.
pub const RESERVED_PREFIX: &str = ".default";

/// Fragment name for a URL: `blog/hello` → `blog.hello`.
pub fn fragment_name(url: &str) -> String {
    url.replace('/', ".")
}

/// URL for a fragment name: `blog.hello` → `blog/hello`.
pub fn url_from_fragment_name(name: &str) -> String {
    name.replace('.', "/")
}

/// First free name among `name`, `name1`, `name2`, …
///
/// `taken` reports whether a candidate collides with an existing page.
pub fn dedup_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    let mut n = 1u32;
    loop {
        let candidate = format!("{name}{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Strip a trailing 3–4 character extension (`about.html` → `about`).
///
/// The extension may not contain dots or whitespace; anything else is
/// returned unchanged.
pub fn strip_extension(url: &str) -> &str {
    let Some(dot) = url.rfind('.') else {
        return url;
    };
    let ext = &url[dot + 1..];
    let len = ext.chars().count();
    if (3..=4).contains(&len) && !ext.chars().any(char::is_whitespace) {
        &url[..dot]
    } else {
        url
    }
}

/// Relative prefix for a page's `<base href>`: `../` per `/` in the URL.
pub fn base_href(url: &str) -> String {
    "../".repeat(url.matches('/').count())
}

/// Whether a URL is reserved and excluded from catalogs.
pub fn is_reserved(url: &str) -> bool {
    url.starts_with(RESERVED_PREFIX)
}

/// Catalog URL for a page file path relative to the site root.
///
/// `blog/hello.html` → `blog/hello`. Separators are normalized to `/`.
pub fn url_from_path(relative: &Path) -> String {
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    strip_extension(joined.trim_start_matches('/')).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fragment_name_round_trip() {
        assert_eq!(fragment_name("blog/2024/hello"), "blog.2024.hello");
        assert_eq!(url_from_fragment_name("blog.2024.hello"), "blog/2024/hello");
    }

    #[test]
    fn dedup_free_name_is_kept() {
        assert_eq!(dedup_name("about", |_| false), "about");
    }

    #[test]
    fn dedup_picks_smallest_unused_suffix() {
        let taken: HashSet<&str> = ["about", "about1"].into_iter().collect();
        assert_eq!(dedup_name("about", |c| taken.contains(c)), "about2");
    }

    #[test]
    fn dedup_fills_gaps_from_one() {
        let taken: HashSet<&str> = ["about", "about2"].into_iter().collect();
        assert_eq!(dedup_name("about", |c| taken.contains(c)), "about1");
    }

    #[test]
    fn strip_extension_html_and_php() {
        assert_eq!(strip_extension("about.html"), "about");
        assert_eq!(strip_extension("about.php"), "about");
        assert_eq!(strip_extension("blog/post.html"), "blog/post");
    }

    #[test]
    fn strip_extension_leaves_other_urls() {
        assert_eq!(strip_extension("about"), "about");
        assert_eq!(strip_extension("archive.js"), "archive.js");
        assert_eq!(strip_extension("page.markdown"), "page.markdown");
        assert_eq!(strip_extension("a.b c"), "a.b c");
    }

    #[test]
    fn base_href_per_directory_level() {
        assert_eq!(base_href("about"), "");
        assert_eq!(base_href("blog/post"), "../");
        assert_eq!(base_href("a/b/c"), "../../");
    }

    #[test]
    fn reserved_prefix() {
        assert!(is_reserved(".default"));
        assert!(is_reserved(".default-old"));
        assert!(!is_reserved("default"));
        assert!(!is_reserved("blog/.default"));
    }

    #[test]
    fn url_from_nested_path() {
        assert_eq!(url_from_path(Path::new("blog/hello.html")), "blog/hello");
        assert_eq!(url_from_path(Path::new("index.html")), "index");
        assert_eq!(url_from_path(Path::new(".default.html")), ".default");
    }
}
