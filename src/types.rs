//! Records shared between the catalog, the page operations, and the CLI.
//!
//! [`Page`] is serialized into the site catalog (`data/pages.json`) with
//! camelCase keys, so the JSON stays readable by the site's front-end code.

use serde::{Deserialize, Deserializer, Serialize};

/// A catalog entry: the metadata derived from one page file.
///
/// Every field defaults to the empty string, both when missing from the
/// JSON and when stored as `null`. Catalogs written by older tooling
/// recorded absent attributes as `false`; those read back as empty too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    /// Plain-text excerpt of the main-content region.
    #[serde(deserialize_with = "lenient_string")]
    pub text: String,
    #[serde(deserialize_with = "lenient_string")]
    pub keywords: String,
    #[serde(deserialize_with = "lenient_string")]
    pub callout: String,
    /// Site-relative path without extension, e.g. `blog/hello`.
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub photo: String,
    #[serde(deserialize_with = "lenient_string")]
    pub thumb: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(deserialize_with = "lenient_string")]
    pub language: String,
    #[serde(deserialize_with = "lenient_string")]
    pub direction: String,
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_modified_by: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_modified_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub template: String,
}

impl Page {
    /// A draft for [`crate::pages::add`]: requested URL plus display fields.
    pub fn draft(url: &str, title: &str, description: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            ..Self::default()
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// One content replacement for [`crate::pages::edit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// CSS selector; the first matching element is changed.
    pub selector: String,
    /// Replacement inner HTML.
    pub html: String,
}

impl Change {
    pub fn new(selector: &str, html: &str) -> Self {
        Self {
            selector: selector.to_string(),
            html: html.to_string(),
        }
    }

    /// Whether the selector denotes the main-content region
    /// (`[role=main]`, with or without quotes and spacing).
    pub fn targets_main(&self) -> bool {
        let normalized: String = self
            .selector
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '"' && *c != '\'')
            .collect();
        normalized == "[role=main]"
    }
}

/// Metadata-only edit for [`crate::pages::edit_settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub callout: String,
    pub language: String,
    pub direction: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_serializes_camel_case() {
        let page = Page {
            last_modified_by: "a@example.com".into(),
            first_name: "Ada".into(),
            ..Page::draft("about", "About", "")
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["lastModifiedBy"], "a@example.com");
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["url"], "about");
        assert!(json.get("last_modified_by").is_none());
    }

    #[test]
    fn page_tolerates_missing_null_and_false_fields() {
        let json = r#"{"url": "about", "title": null, "language": false, "callout": 3}"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(page.url, "about");
        assert_eq!(page.title, "");
        assert_eq!(page.language, "");
        assert_eq!(page.callout, "3");
        assert_eq!(page.thumb, "");
    }

    #[test]
    fn change_targets_main_quoted_and_bare() {
        assert!(Change::new(r#"[role="main"]"#, "").targets_main());
        assert!(Change::new("[role=main]", "").targets_main());
        assert!(Change::new("[role='main']", "").targets_main());
        assert!(!Change::new("#sidebar", "").targets_main());
        assert!(!Change::new("[role=main] p", "").targets_main());
    }
}
