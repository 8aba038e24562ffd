//! HTML serialization of the document tree.

use super::{Document, Element, Node};
use crate::utils::html::{escape, escape_attr, is_raw_text_element, is_void_element};

/// Render the document root (including the root element itself).
pub fn render_document(doc: &Document) -> String {
    let mut out = String::with_capacity(4096);
    render_element(&doc.root, &mut out);
    out
}

/// Render a list of nodes without a wrapping element.
pub fn render_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(node, false, &mut out);
    }
    out
}

fn render_node(node: &Node, raw_text: bool, out: &mut String) {
    match node {
        Node::Element(elem) => render_element(elem, out),
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => out.push_str(&escape(text)),
        Node::Raw(html) => out.push_str(html),
        // Unclaimed markers read back as the author wrote them; the converter
        // consumed the marker's paragraph, so `<p>` stands in for it wherever
        // it sat, nested or not
        Node::Directive(directive) => {
            out.push_str("<p>");
            out.push_str(&escape(&directive.source));
            out.push_str("</p>");
        }
    }
}

fn render_element(elem: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&elem.tag);
    for (name, value) in elem.attrs.iter() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');

    if is_void_element(&elem.tag) {
        return;
    }

    let raw_text = is_raw_text_element(&elem.tag);
    for child in &elem.children {
        render_node(child, raw_text, out);
    }

    out.push_str("</");
    out.push_str(&elem.tag);
    out.push('>');
}
