//! HTML document access for page files.
//!
//! Pages are read and mutated through a small capability surface:
//!
//! - [`Document::find`] / [`Document::first`]: CSS selector lookup
//! - [`Document::inner_html`] / [`Document::text`]: read an element's content
//! - [`Document::set_inner_html`] / [`Document::set_inner_text`]: replace it
//! - [`Document::attr`] / [`Document::set_attr`]: element attributes
//! - [`Document::to_html`]: serialize the document
//!
//! Parsing is done by `scraper`, which keeps the DOM in an `ego-tree`.
//! Edits rewrite that tree in place: replacement markup is parsed as a
//! fragment and its nodes are spliced under the target element, so later
//! lookups see the new content immediately. Serialization goes through
//! html5ever with scripting enabled, matching how the page was parsed
//! (`noscript` content is raw text both ways).
//!
//! Round-tripped markup is normalized by the parser (missing `head`/`body`
//! are inserted, attribute quoting is uniform). Whitespace and formatting
//! are not preserved byte-for-byte.

use ego_tree::{NodeId, NodeMut, NodeRef};
use html5ever::serialize::{Serialize, SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::{Element, Text};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Element-level hook for [`Document::render`].
///
/// Receives the element name and its attributes (prefixed attributes as
/// `prefix:name`). Returns the name and attributes to keep, or `None` to
/// drop the element together with its subtree.
pub trait ElementRewriter {
    fn rewrite(
        &self,
        name: &str,
        attrs: Vec<(String, String)>,
    ) -> Option<(String, Vec<(String, String)>)>;
}

/// A parsed HTML document or fragment.
pub struct Document {
    html: Html,
    fragment: bool,
}

impl Document {
    /// Parse a full HTML document.
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
            fragment: false,
        }
    }

    /// Parse an HTML fragment (e.g. the inner HTML of a region).
    ///
    /// Serializing a fragment emits only the parsed content, without the
    /// `html` wrapper the parser places around it.
    pub fn parse_fragment(source: &str) -> Self {
        Self {
            html: Html::parse_fragment(source),
            fragment: true,
        }
    }

    /// The node whose descendants make up the content: the document root,
    /// or the wrapper element of a fragment.
    fn scope(&self) -> NodeRef<'_, Node> {
        if self.fragment {
            *self.html.root_element()
        } else {
            self.html.tree.root()
        }
    }

    /// Attached elements in document order. Nodes detached by an edit stay
    /// in the arena but are no longer reachable from the scope.
    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.scope().descendants().skip(1).filter_map(ElementRef::wrap)
    }

    /// All elements matching `selector`, in document order.
    ///
    /// An unparseable selector matches nothing.
    pub fn find(&self, selector: &str) -> Vec<NodeId> {
        match parse_selector(selector) {
            Some(selector) => self
                .elements()
                .filter(|el| selector.matches(el))
                .map(|el| el.id())
                .collect(),
            None => Vec::new(),
        }
    }

    /// The first element matching `selector`.
    pub fn first(&self, selector: &str) -> Option<NodeId> {
        let selector = parse_selector(selector)?;
        self.elements()
            .find(|el| selector.matches(el))
            .map(|el| el.id())
    }

    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        self.element(id)
            .map(|el| to_markup(&el, TraversalScope::ChildrenOnly(None)))
            .unwrap_or_default()
    }

    /// Concatenated text content of an element, tags stripped and
    /// entities decoded.
    pub fn text(&self, id: NodeId) -> String {
        self.element(id)
            .map(|el| el.text().collect())
            .unwrap_or_default()
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        self.element(id)
            .and_then(|el| el.value().attr(name))
            .map(str::to_string)
    }

    /// Set (or add) an attribute on an element. New attributes go last.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let Some(element) = self.element(id) else {
            return;
        };
        let element = element.value();
        let value = value.into();

        let mut attrs = attributes(element);
        match attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => attrs.push((name.to_string(), value)),
        }
        let replacement = rebuild(element, &element.name.local, attrs);
        self.replace(id, replacement);
    }

    /// Replace the children of an element with parsed HTML.
    ///
    /// Void elements have no children; the edit is skipped.
    pub fn set_inner_html(&mut self, id: NodeId, html: impl Into<String>) {
        let Some(element) = self.element(id) else {
            return;
        };
        let name = element.value().name();
        if VOID_ELEMENTS.contains(&name) {
            debug!("Ignoring inner HTML for void element <{}>", name);
            return;
        }

        let html: String = html.into();
        let parsed = Html::parse_fragment(&html);
        let Some(mut target) = self.html.tree.get_mut(id) else {
            return;
        };
        clear_children(&mut target);
        for child in parsed.root_element().children() {
            append_copy(&mut target, child);
        }
    }

    /// Replace the children of an element with a single text node.
    pub fn set_inner_text(&mut self, id: NodeId, text: &str) {
        let Some(mut target) = self.html.tree.get_mut(id) else {
            return;
        };
        if !target.value().is_element() {
            return;
        }
        clear_children(&mut target);
        target.append(Node::Text(Text {
            text: text.into(),
        }));
    }

    pub fn to_html(&self) -> String {
        if self.fragment {
            return to_markup(&self.html.root_element(), TraversalScope::ChildrenOnly(None));
        }
        let out = to_markup(&self.html, TraversalScope::IncludeNode);
        self.restore_doctype_ids(out)
    }

    /// Serialize a copy of the document with every element passed through
    /// `rewriter`. The document itself is left untouched.
    pub fn render(&self, rewriter: &dyn ElementRewriter) -> String {
        let mut copy = Self {
            html: self.html.clone(),
            fragment: self.fragment,
        };
        copy.rewrite(rewriter);
        copy.to_html()
    }

    fn rewrite(&mut self, rewriter: &dyn ElementRewriter) {
        let ids: Vec<NodeId> = self.elements().map(|el| el.id()).collect();
        for id in ids {
            let Some(element) = self.element(id) else {
                continue;
            };
            // Descendants of a dropped element are gone with it.
            if !element.ancestors().any(|a| a.id() == self.scope().id()) {
                continue;
            }
            let element = element.value();
            match rewriter.rewrite(element.name(), attributes(element)) {
                Some((name, attrs)) => {
                    let replacement = rebuild(element, &name, attrs);
                    self.replace(id, replacement);
                }
                None => {
                    if let Some(mut node) = self.html.tree.get_mut(id) {
                        node.detach();
                    }
                }
            }
        }
    }

    fn replace(&mut self, id: NodeId, element: Element) {
        if let Some(mut node) = self.html.tree.get_mut(id) {
            *node.value() = Node::Element(element);
        }
    }

    /// html5ever writes `<!DOCTYPE name>` only; put back public and system
    /// identifiers of legacy doctypes.
    fn restore_doctype_ids(&self, out: String) -> String {
        let doctype = self
            .html
            .tree
            .root()
            .children()
            .find_map(|node| node.value().as_doctype());
        let Some(doctype) = doctype else {
            return out;
        };
        if doctype.public_id().is_empty() && doctype.system_id().is_empty() {
            return out;
        }

        let mut full = format!("<!DOCTYPE {}", doctype.name());
        if !doctype.public_id().is_empty() {
            full.push_str(&format!(r#" PUBLIC "{}""#, doctype.public_id()));
        } else {
            full.push_str(" SYSTEM");
        }
        if !doctype.system_id().is_empty() {
            full.push_str(&format!(r#" "{}""#, doctype.system_id()));
        }
        full.push('>');
        out.replacen(&format!("<!DOCTYPE {}>", doctype.name()), &full, 1)
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Failed to parse selector '{}': {}", selector, e);
            None
        }
    }
}

fn to_markup<T: Serialize>(node: &T, traversal_scope: TraversalScope) -> String {
    let mut buf = Vec::new();
    let opts = SerializeOpts {
        scripting_enabled: true,
        traversal_scope,
        create_missing_parent: false,
    };
    if let Err(e) = serialize(&mut buf, node, opts) {
        warn!("Failed to serialize HTML: {}", e);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn clear_children(node: &mut NodeMut<'_, Node>) {
    while let Some(mut child) = node.first_child() {
        child.detach();
    }
}

fn append_copy(parent: &mut NodeMut<'_, Node>, source: NodeRef<'_, Node>) {
    let mut copy = parent.append(source.value().clone());
    for child in source.children() {
        append_copy(&mut copy, child);
    }
}

fn qualified(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

/// Attributes in source order, prefixed names as `prefix:name`.
fn attributes(element: &Element) -> Vec<(String, String)> {
    element
        .attrs
        .iter()
        .map(|(name, value)| (qualified(name), value.to_string()))
        .collect()
}

/// A new element named `name` in `original`'s namespace. Attributes that
/// existed on `original` keep their namespace and prefix.
fn rebuild(original: &Element, name: &str, attrs: Vec<(String, String)>) -> Element {
    let attrs = attrs
        .into_iter()
        .map(|(key, value)| Attribute {
            name: original
                .attrs
                .keys()
                .find(|existing| qualified(existing) == key)
                .cloned()
                .unwrap_or_else(|| {
                    QualName::new(None, Namespace::from(""), LocalName::from(key.as_str()))
                }),
            value: StrTendril::from_slice(&value),
        })
        .collect();
    let name = QualName::new(
        original.name.prefix.clone(),
        original.name.ns.clone(),
        LocalName::from(name),
    );
    Element::new(name, attrs)
}

/// Text content of an HTML fragment, tags stripped and entities decoded.
pub fn fragment_text(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .collect()
}
