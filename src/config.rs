//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml` files.
//! Configuration is hierarchical: stock defaults are overridden by the
//! sites-root config, which is overridden by each site's own config.
//!
//! ## Config File Location
//!
//! ```text
//! sites/
//! ├── config.toml              # Root config (overrides stock defaults)
//! ├── portfolio/
//! │   ├── config.toml          # Site config (overrides root)
//! │   ├── data/pages.json
//! │   └── index.html
//! └── blog/
//!     └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! friendly_urls = true         # Serve pages without the .html suffix
//! default_template = "default" # templates/<name>.html used for new pages
//! language = "en"              # Fallback lang for pages without one
//! direction = "ltr"            # Fallback dir: "ltr" or "rtl"
//!
//! [settings]
//! amp = "false"                # "true" writes <url>-amp.html on save
//!
//! [user]
//! first_name = ""
//! last_name = ""
//! email = ""
//!
//! [processing]
//! max_processes = 4            # Rebuild workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Whether the site serves pages without the `.html` suffix.
    pub friendly_urls: bool,
    /// Template used for new pages (`templates/<name>.html`).
    pub default_template: String,
    /// Language for pages whose `<html>` carries no `lang`.
    pub language: String,
    /// Direction for pages whose `<html>` carries no `dir`.
    pub direction: String,
    /// Free-form site settings (`amp`, ...).
    pub settings: BTreeMap<String, String>,
    /// Acting user for CLI operations.
    pub user: UserConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            friendly_urls: true,
            default_template: "default".to_string(),
            language: "en".to_string(),
            direction: "ltr".to_string(),
            settings: BTreeMap::new(),
            user: UserConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.direction != "ltr" && self.direction != "rtl" {
            return Err(ConfigError::Validation(
                "direction must be \"ltr\" or \"rtl\"".into(),
            ));
        }
        if self.default_template.contains('/') {
            return Err(ConfigError::Validation(
                "default_template must be a bare template name".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// The user recorded as `lastModifiedBy` for CLI edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers for catalog rebuilds.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as TOML, the bottom layer of the cascade.
fn stock_layer() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Deep-merge `overlay` into `base`: tables merge per key, anything else
/// in `overlay` wins outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut table), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                let value = match table.remove(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => value,
                };
                table.insert(key, value);
            }
            toml::Value::Table(table)
        }
        (_, overlay) => overlay,
    }
}

/// `<dir>/config.toml` as raw TOML, or `None` when the directory has none.
fn read_layer(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let content = match fs::read_to_string(dir.join("config.toml")) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(toml::from_str(&content)?))
}

/// Merge overlays in order onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = Option<toml::Value>>,
) -> Result<SiteConfig, ConfigError> {
    let merged = overlays
        .into_iter()
        .flatten()
        .fold(base, merge_toml);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config for one site: stock defaults, then
/// `<sites_root>/config.toml`, then `<site_dir>/config.toml`.
pub fn load_site_config(sites_root: &Path, site_dir: &Path) -> Result<SiteConfig, ConfigError> {
    let root = read_layer(sites_root)?;
    let site = if site_dir == sites_root {
        None
    } else {
        read_layer(site_dir)?
    };
    resolve_config(stock_layer(), [root, site])
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# respond-pages configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Config files can be placed at two levels:
#   sites/config.toml            -> root (overrides stock defaults)
#   sites/<site>/config.toml     -> site (overrides root)
#
# Each level only needs the keys it wants to override.
# Unknown keys will cause an error.

# Serve pages without the .html suffix. When false, listed page URLs
# get ".html" appended.
friendly_urls = true

# Template for new pages, read from <site>/templates/<name>.html.
# When missing, <site>/.default.html is used instead.
default_template = "default"

# Fallback language and text direction for pages whose <html> element
# has no lang/dir attribute.
language = "en"
direction = "ltr"

# ---------------------------------------------------------------------------
# Site settings
# ---------------------------------------------------------------------------
[settings]
# "true" (any case) writes an AMP copy of each page as <url>-amp.html.
# amp = "false"

# ---------------------------------------------------------------------------
# Acting user (recorded as lastModifiedBy)
# ---------------------------------------------------------------------------
[user]
first_name = ""
last_name = ""
email = ""

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers used when rebuilding a catalog.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
