//! Post compilation pipeline.
//!
//! ```text
//! markdown ──> Document ──> Twitter ──> GitHub ──> Caption ──> HTML
//! ```
//!
//! Synchronous and per-document, so posts compile in parallel with rayon.

pub mod transform;

use crate::markdown::{MarkdownOptions, from_markdown};
use crate::vdom::render::render_document;
use crate::vdom::{Document, Element, Node, PageSeed, Pipeline};

pub use transform::{GithubCardTransform, ImageCaptionTransform, TwitterCardTransform};

/// Convert a markdown body and run every transform over it.
///
/// `permalink` seeds the ids of generated widgets, so the same post always
/// produces the same HTML.
pub fn compile(markdown: &str, permalink: &str, options: &MarkdownOptions) -> String {
    let doc = from_markdown(markdown, options, PageSeed::from_path(permalink));
    render_document(&transform(doc))
}

/// Run the transforms in order. Tweets go first so a status link is never
/// mistaken for a caption paragraph.
pub fn transform(doc: Document) -> Document {
    Pipeline::new(doc)
        .pipe(TwitterCardTransform)
        .pipe(GithubCardTransform)
        .inspect_if(crate::logger::is_verbose(), |doc| {
            let left = count_directives(&doc.root);
            if left > 0 {
                crate::debug!("compile"; "{left} directive(s) rendered as text");
            }
        })
        .pipe(ImageCaptionTransform)
        .into_inner()
}

fn count_directives(elem: &Element) -> usize {
    elem.children
        .iter()
        .map(|child| match child {
            Node::Directive(_) => 1,
            Node::Element(elem) => count_directives(elem),
            _ => 0,
        })
        .sum()
}
