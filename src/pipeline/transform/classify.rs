//! Shape predicates over tree nodes.
//!
//! Pure functions; the transforms decide what to do with a match.

use crate::vdom::{Element, Node};

#[inline]
pub fn is_whitespace_text(node: &Node) -> bool {
    node.as_text().is_some_and(|text| text.trim().is_empty())
}

#[inline]
fn is_meaningful_text(text: &str) -> bool {
    !text.trim().is_empty()
}

/// `<em>` whose children are all text, at least one of it non-blank.
pub fn is_inline_em_caption(node: &Node) -> bool {
    let Some(em) = node.as_tag("em") else {
        return false;
    };

    let mut has_text = false;
    for child in &em.children {
        match child.as_text() {
            Some(text) => has_text |= is_meaningful_text(text),
            None => return false,
        }
    }
    has_text
}

/// `<p>` made only of text and text-only `<em>` runs, with some non-blank text.
pub fn is_caption_paragraph(node: &Node) -> bool {
    let Some(p) = node.as_tag("p") else {
        return false;
    };

    let mut has_text = false;
    for child in &p.children {
        if let Some(text) = child.as_text() {
            has_text |= is_meaningful_text(text);
        } else if let Some(em) = child.as_tag("em") {
            for em_child in &em.children {
                match em_child.as_text() {
                    Some(text) => has_text |= is_meaningful_text(text),
                    None => return false,
                }
            }
        } else {
            return false;
        }
    }
    has_text
}

/// Where a paragraph `[..., img, ws*, em]` splits into lead-in and figure.
///
/// Returns `(img_index, em_index)` when the first image precedes a trailing
/// caption `<em>` with only whitespace text between them.
pub fn inline_caption_bounds(p: &Element) -> Option<(usize, usize)> {
    if p.tag != "p" {
        return None;
    }

    let img = p.children.iter().position(|child| child.is_tag("img"))?;
    let last = p.children.iter().rposition(|child| !is_whitespace_text(child))?;

    if img >= last || !is_inline_em_caption(&p.children[last]) {
        return None;
    }
    if !p.children[img + 1..last].iter().all(is_whitespace_text) {
        return None;
    }

    Some((img, last))
}

/// A bare `<img>`, or a `<p>` whose only meaningful child is one.
pub fn is_standalone_image(node: &Node) -> bool {
    if node.is_tag("img") {
        return true;
    }
    let Some(p) = node.as_tag("p") else {
        return false;
    };

    let mut meaningful = p.children.iter().filter(|child| !is_whitespace_text(child));
    matches!(
        (meaningful.next(), meaningful.next()),
        (Some(only), None) if only.is_tag("img")
    )
}

/// Raw URL of a paragraph whose single child is a link or a text run.
pub fn sole_link_or_text(p: &Element) -> Option<&str> {
    if p.tag != "p" {
        return None;
    }
    match p.children.as_slice() {
        [Node::Text(text)] => Some(text.as_str()),
        [Node::Element(a)] if a.tag == "a" => a.get_attr("href"),
        _ => None,
    }
}
