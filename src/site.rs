//! Sites and acting users.
//!
//! A site is a directory of static HTML pages under the sites root:
//!
//! ```text
//! sites/portfolio/
//! ├── config.toml            # Site config (optional)
//! ├── data/pages.json        # Catalog
//! ├── fragments/page/        # Fragment files (mark slugs as taken)
//! ├── templates/default.html # Template for new pages
//! ├── .default.html          # Legacy default content
//! ├── index.html             # Pages
//! └── blog/hello.html
//! ```

use crate::config::{self, ConfigError, SiteConfig, UserConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Site-relative location of the catalog.
pub const CATALOG_PATH: &str = "data/pages.json";

/// A site the page operations act on.
#[derive(Debug, Clone)]
pub struct Site {
    pub id: String,
    /// Public root directory of the site.
    pub root: PathBuf,
    pub supports_friendly_urls: bool,
    pub default_template: String,
    /// Fallback `lang` for pages without one.
    pub language: String,
    /// Fallback `dir` for pages without one.
    pub direction: String,
    pub settings: BTreeMap<String, String>,
}

impl Site {
    /// A site with stock configuration.
    pub fn new(id: &str, root: impl Into<PathBuf>) -> Self {
        Self::from_config(id, root, &SiteConfig::default())
    }

    pub fn from_config(id: &str, root: impl Into<PathBuf>, config: &SiteConfig) -> Self {
        Self {
            id: id.to_string(),
            root: root.into(),
            supports_friendly_urls: config.friendly_urls,
            default_template: config.default_template.clone(),
            language: config.language.clone(),
            direction: config.direction.clone(),
            settings: config.settings.clone(),
        }
    }

    /// Open `<sites_root>/<id>` with its cascaded configuration.
    pub fn open(sites_root: &Path, id: &str) -> Result<(Self, SiteConfig), ConfigError> {
        let root = sites_root.join(id);
        let config = config::load_site_config(sites_root, &root)?;
        Ok((Self::from_config(id, root, &config), config))
    }

    /// A site setting by key.
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Whether AMP copies are written on save (`amp` setting, any case of `true`).
    pub fn amp_enabled(&self) -> bool {
        self.setting("amp")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    pub fn page_file(&self, url: &str) -> PathBuf {
        self.root.join(format!("{url}.html"))
    }

    pub fn amp_file(&self, url: &str) -> PathBuf {
        self.root.join(format!("{url}-amp.html"))
    }

    pub fn catalog_file(&self) -> PathBuf {
        catalog_path(&self.root)
    }

    pub fn fragment_file(&self, name: &str) -> PathBuf {
        self.root
            .join("fragments")
            .join("page")
            .join(format!("{name}.html"))
    }

    pub fn template_file(&self, name: &str) -> PathBuf {
        self.root.join("templates").join(format!("{name}.html"))
    }

    pub fn legacy_default_file(&self) -> PathBuf {
        self.root.join(".default.html")
    }
}

/// Catalog location for a site directory.
pub fn catalog_path(site_root: &Path) -> PathBuf {
    site_root.join(CATALOG_PATH)
}

/// The user performing an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
        }
    }
}

impl From<&UserConfig> for User {
    fn from(config: &UserConfig) -> Self {
        Self::new(&config.first_name, &config.last_name, &config.email)
    }
}
