//! # Respond Pages
//!
//! Page management for file-backed static HTML sites. Every page is a
//! plain `.html` file under its site directory; a JSON catalog
//! (`data/pages.json`) caches the metadata extracted from those files so
//! listings don't have to parse every page.
//!
//! # Two Representations, One Source of Truth
//!
//! ```text
//! <site>/<url>.html   ──extract──►   <site>/data/pages.json
//!   (source of truth)                 (rebuildable cache)
//! ```
//!
//! Operations that change a page write the HTML first and then update the
//! catalog. The catalog can always be regenerated from disk with
//! [`catalog::refresh`], which is also what [`pages::remove`] does after
//! deleting a file.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pages`] | Page operations: add, edit, save, edit settings, remove, AMP copies |
//! | [`catalog`] | Catalog load/save, rebuild from disk, lookup and listing |
//! | [`extract`] | Metadata extraction from page markup, timestamps |
//! | [`dom`] | Selector lookup and edits over parsed HTML, serialization |
//! | [`amp`] | Conversion of main-content markup to AMP HTML |
//! | [`site`] | Site paths and settings, acting user |
//! | [`slug`] | URL conventions: fragment names, dedup, extensions, base href |
//! | [`config`] | Hierarchical `config.toml` loading, validation, and merging |
//! | [`types`] | Catalog entry and edit request types |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Degrade on Read, Fail on Write
//!
//! Sites are edited by hand as often as by this tool. A missing `<title>`,
//! an unparseable catalog, or a page file that vanished are all normal
//! states and yield empty values or "not found". Only failing to write a
//! page or the catalog is reported as an error.
//!
//! ## Config Cascading (Root → Site)
//!
//! ```text
//! sites/config.toml            ← root (overrides stock defaults)
//! sites/portfolio/config.toml  ← site (overrides root)
//! ```
//!
//! The merge logic lives in [`config::merge_toml`].
//!
//! ## Single Writer
//!
//! The catalog is rewritten whole on every change, atomically via a
//! rename. Nothing locks it: two processes editing the same site at once
//! will lose one of the updates.

pub mod amp;
pub mod catalog;
pub mod config;
pub mod dom;
pub mod extract;
pub mod output;
pub mod pages;
pub mod site;
pub mod slug;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
