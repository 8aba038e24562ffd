//! Document tree for compiled posts.
//!
//! Markdown is converted into this tree, transforms rewrite it, and
//! `render` serializes it back to HTML.
//!
//! ```text
//! Document
//!   root: <article>
//!     Node::Element  (tag, attrs, children)
//!     Node::Text     (unescaped text)
//!     Node::Directive(`::name[...]{...}` marker awaiting a transform)
//!     Node::Raw      (trusted HTML emitted verbatim)
//! ```
//!
//! The tree is strictly owned: transforms rebuild a level's child list by
//! moving nodes, so a node can never appear twice.

mod pipeline;
pub mod render;

use smallvec::SmallVec;

use crate::markdown::directive::DirectiveArgs;

pub use pipeline::{Pipeline, Transform};

// =============================================================================
// Document
// =============================================================================

/// A compiled post body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
    pub seed: PageSeed,
}

impl Document {
    pub fn new(root: Element, seed: PageSeed) -> Self {
        Self { root, seed }
    }
}

/// Stable per-page prefix for generated DOM ids.
///
/// Derived from the page permalink, so ids are identical across builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageSeed(u32);

impl PageSeed {
    pub fn from_path(path: &str) -> Self {
        let hash = blake3::hash(path.as_bytes());
        let bytes = hash.as_bytes();
        Self(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Eight lowercase hex digits.
    pub fn to_hex(self) -> String {
        format!("{:08x}", self.0)
    }
}

// =============================================================================
// Nodes
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Box<Element>),
    Text(String),
    Directive(Box<Directive>),
    Raw(String),
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn element(elem: Element) -> Self {
        Self::Element(Box::new(elem))
    }

    /// Element view of this node, if it is one.
    #[inline]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(elem) => Some(elem),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(elem) => Some(elem),
            _ => None,
        }
    }

    /// Element view of this node if its tag is `tag`.
    #[inline]
    pub fn as_tag(&self, tag: &str) -> Option<&Element> {
        self.as_element().filter(|elem| elem.tag == tag)
    }

    #[inline]
    pub fn is_tag(&self, tag: &str) -> bool {
        self.as_tag(tag).is_some()
    }

    /// Text content if this is a text node.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A leaf directive left in place by the markdown converter.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub args: DirectiveArgs,
    /// Markdown source of the marker, rendered literally when nothing claims it.
    pub source: String,
}

// =============================================================================
// Elements
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Attrs,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attrs::default(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(name, value);
        self
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[inline]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }

    #[inline]
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.set(name, value);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(elem) => collect_text(&elem.children, out),
            Node::Directive(_) | Node::Raw(_) => {}
        }
    }
}

// =============================================================================
// Attributes
// =============================================================================

/// Ordered attribute list. Names are unique; insertion order is kept so
/// output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(SmallVec<[(String, String); 4]>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(key, _)| key == name)
    }

    /// Insert or overwrite.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    /// Insert only when `name` is not present yet.
    pub fn set_if_absent(&mut self, name: &str, value: &str) {
        if !self.contains(name) {
            self.0.push((name.to_owned(), value.to_owned()));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}
