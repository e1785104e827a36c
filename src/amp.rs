//! AMP conversion of main-content markup.
//!
//! Sites with the `amp` setting enabled get an `<url>-amp.html` sibling
//! next to each saved page. It holds the page's main-content markup passed
//! through an [`AmpConverter`] and is written as returned.
//!
//! [`BasicAmpConverter`] covers the elements that make regular markup
//! invalid AMP:
//!
//! | Input | Output |
//! |-------|--------|
//! | `img` | `amp-img layout="responsive"` |
//! | `iframe` | `amp-iframe layout="responsive"` |
//! | `video` | `amp-video layout="responsive"` |
//! | `script`, `style` | dropped with their content |
//! | `style="…"`, `on*="…"` | attribute dropped |

use crate::dom::{Document, ElementRewriter};

/// Converts an HTML fragment to AMP HTML.
pub trait AmpConverter {
    fn convert(&self, html: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAmpConverter;

impl AmpConverter for BasicAmpConverter {
    fn convert(&self, html: &str) -> String {
        Document::parse_fragment(html).render(self)
    }
}

impl ElementRewriter for BasicAmpConverter {
    fn rewrite(
        &self,
        name: &str,
        attrs: Vec<(String, String)>,
    ) -> Option<(String, Vec<(String, String)>)> {
        let mut attrs: Vec<(String, String)> = attrs
            .into_iter()
            .filter(|(key, _)| key != "style" && !key.starts_with("on"))
            .collect();

        let name = match name {
            "script" | "style" => return None,
            "img" => "amp-img",
            "iframe" => "amp-iframe",
            "video" => "amp-video",
            other => return Some((other.to_string(), attrs)),
        };

        match attrs.iter_mut().find(|(key, _)| key == "layout") {
            Some(slot) => slot.1 = "responsive".to_string(),
            None => attrs.push(("layout".to_string(), "responsive".to_string())),
        }
        Some((name.to_string(), attrs))
    }
}
