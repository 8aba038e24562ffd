//! Image caption pairing.
//!
//! Turns an image plus an adjacent caption into
//! `<figure class="image-caption"><img><figcaption>...</figcaption></figure>`:
//!
//! - inline: `![](a.png)\n*caption*` in one paragraph, where the `<em>` is the
//!   last meaningful child and only whitespace separates it from the image.
//!   Anything before the image stays behind in a paragraph of its own.
//! - adjacent: an `<img>` followed by a paragraph made only of text and
//!   `<em>` runs. An image alone in its own paragraph (how markdown writes a
//!   standalone image) counts as that image, and the wrapper is dropped.
//!
//! Every image in the document gets lazy-loading hints unless the author set
//! them. Anything ambiguous is left alone.

use std::collections::VecDeque;

use super::classify::{
    inline_caption_bounds, is_caption_paragraph, is_standalone_image, is_whitespace_text,
};
use crate::vdom::{Document, Element, Node, Transform};

const FIGURE_CLASS: &str = "image-caption";

const LAZY_ATTRS: [(&str, &str); 3] = [
    ("loading", "lazy"),
    ("decoding", "async"),
    ("fetchpriority", "low"),
];

/// Pairs images with captions and adds loading hints.
pub struct ImageCaptionTransform;

impl Transform for ImageCaptionTransform {
    fn transform(self, mut doc: Document) -> Document {
        wrap_images(&mut doc.root);
        doc
    }
}

/// Rebuild `parent`'s children with captions paired, then descend.
fn wrap_images(parent: &mut Element) {
    let mut queue: VecDeque<Node> = std::mem::take(&mut parent.children).into();
    let mut out = Vec::with_capacity(queue.len());

    while let Some(node) = queue.pop_front() {
        let node = match node {
            Node::Element(p) => match inline_caption_bounds(&p) {
                Some(bounds) => {
                    out.extend(split_inline_caption(*p, bounds));
                    continue;
                }
                None => Node::Element(p),
            },
            other => other,
        };

        if is_standalone_image(&node)
            && let Some(gap) = queue.iter().position(|next| !is_whitespace_text(next))
            && is_caption_paragraph(&queue[gap])
        {
            queue.drain(..gap);
            if let Some(Node::Element(caption)) = queue.pop_front() {
                out.push(figure(unwrap_image(node), caption.children));
                continue;
            }
        }

        out.push(node);
    }

    for child in &mut out {
        if let Some(elem) = child.as_element_mut() {
            if elem.tag == "img" {
                apply_lazy_image_attrs(elem);
            } else if !elem.children.is_empty() {
                wrap_images(elem);
            }
        }
    }

    parent.children = out;
}

/// Split `[lead.., img, ws.., em, ws..]` into an optional lead paragraph and
/// a figure.
fn split_inline_caption(p: Element, (img, em): (usize, usize)) -> Vec<Node> {
    let Element {
        tag,
        attrs,
        mut children,
    } = p;

    children.truncate(em + 1);
    let caption = match children.pop() {
        Some(Node::Element(run)) => run.children,
        _ => Vec::new(),
    };
    let mut image = children.split_off(img);
    image.truncate(1);

    let lead: Vec<Node> = children
        .into_iter()
        .filter(|child| !is_whitespace_text(child))
        .collect();

    let mut out = Vec::with_capacity(2);
    if !lead.is_empty() {
        out.push(Node::element(
            Element::new(tag).with_attrs(attrs).with_children(lead),
        ));
    }
    out.push(Node::element(
        Element::new("figure")
            .with_attr("class", FIGURE_CLASS)
            .with_children(image)
            .with_child(Node::element(
                Element::new("figcaption").with_children(caption),
            )),
    ));
    out
}

fn figure(image: Node, caption: Vec<Node>) -> Node {
    Node::element(
        Element::new("figure")
            .with_attr("class", FIGURE_CLASS)
            .with_child(image)
            .with_child(Node::element(
                Element::new("figcaption").with_children(caption),
            )),
    )
}

/// `<p><img></p>` gives up its image; a bare `<img>` passes through.
fn unwrap_image(node: Node) -> Node {
    match node {
        Node::Element(p) if p.tag == "p" => {
            let p = *p;
            p.children
                .into_iter()
                .find(|child| child.is_tag("img"))
                .unwrap_or_else(|| Node::element(Element::new("p")))
        }
        other => other,
    }
}

fn apply_lazy_image_attrs(img: &mut Element) {
    for (name, value) in LAZY_ATTRS {
        img.attrs.set_if_absent(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{MarkdownOptions, from_markdown};
    use crate::vdom::render::render_nodes;
    use crate::vdom::{Pipeline, PageSeed};

    const LAZY: &str = r#"loading="lazy" decoding="async" fetchpriority="low""#;

    fn run(children: Vec<Node>) -> Vec<Node> {
        let doc = Document::new(
            Element::new("article").with_children(children),
            PageSeed::default(),
        );
        ImageCaptionTransform.transform(doc).root.children
    }

    fn run_markdown(markdown: &str) -> String {
        let doc = from_markdown(markdown, &MarkdownOptions::all(), PageSeed::default());
        let doc = Pipeline::new(doc).pipe(ImageCaptionTransform).into_inner();
        render_nodes(&doc.root.children)
    }

    fn img(src: &str) -> Node {
        Node::element(Element::new("img").with_attr("src", src))
    }

    fn em(text: &str) -> Node {
        Node::element(Element::new("em").with_child(Node::text(text)))
    }

    fn p(children: Vec<Node>) -> Node {
        Node::element(Element::new("p").with_children(children))
    }

    #[test]
    fn test_image_then_caption_paragraph() {
        let out = run(vec![
            img("a.png"),
            Node::text("\n"),
            p(vec![Node::text("A "), em("cat")]),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(
            render_nodes(&out),
            format!(
                r#"<figure class="image-caption"><img src="a.png" {LAZY}><figcaption>A <em>cat</em></figcaption></figure>"#
            )
        );
    }

    #[test]
    fn test_inline_caption_markdown() {
        assert_eq!(
            run_markdown("![cat](a.png)\n*a sleeping cat*"),
            format!(
                r#"<figure class="image-caption"><img src="a.png" alt="cat" {LAZY}><figcaption>a sleeping cat</figcaption></figure>"#
            )
        );
    }

    #[test]
    fn test_inline_caption_keeps_lead_paragraph() {
        let para = Element::new("p")
            .with_attr("class", "intro")
            .with_children(vec![
                Node::text("Look:"),
                Node::text(" "),
                img("a.png"),
                Node::text("\n"),
                em("caption"),
            ]);
        let out = run(vec![Node::element(para)]);
        assert_eq!(out.len(), 2);
        assert_eq!(
            render_nodes(&out[..1]),
            r#"<p class="intro">Look:</p>"#
        );
        assert!(out[1].is_tag("figure"));
    }

    #[test]
    fn test_separate_paragraphs_markdown() {
        assert_eq!(
            run_markdown("![cat](a.png)\n\n*a sleeping cat*\n\nnext"),
            format!(
                r#"<figure class="image-caption"><img src="a.png" alt="cat" {LAZY}><figcaption><em>a sleeping cat</em></figcaption></figure><p>next</p>"#
            )
        );
    }

    #[test]
    fn test_text_paragraph_after_markdown_image() {
        assert_eq!(
            run_markdown("![cat](a.png)\n\nPhoto: *Tokyo*"),
            format!(
                r#"<figure class="image-caption"><img src="a.png" alt="cat" {LAZY}><figcaption>Photo: <em>Tokyo</em></figcaption></figure>"#
            )
        );
    }

    #[test]
    fn test_markdown_image_before_link_paragraph_is_left_alone() {
        assert_eq!(
            run_markdown("![cat](a.png)\n\nsee [more](/m)"),
            format!(r#"<p><img src="a.png" alt="cat" {LAZY}></p><p>see <a href="/m">more</a></p>"#)
        );
    }

    #[test]
    fn test_last_child_is_processed() {
        // A trailing image with nothing after it still gets hints
        let out = run(vec![p(vec![Node::text("x")]), img("z.png")]);
        assert_eq!(
            render_nodes(&out[1..]),
            format!(r#"<img src="z.png" {LAZY}>"#)
        );
    }

    #[test]
    fn test_existing_hints_are_kept() {
        let eager = Element::new("img")
            .with_attr("src", "a.png")
            .with_attr("loading", "eager");
        let out = run(vec![Node::element(eager)]);
        assert_eq!(
            render_nodes(&out),
            r#"<img src="a.png" loading="eager" decoding="async" fetchpriority="low">"#
        );
    }

    #[test]
    fn test_ambiguous_inputs_are_untouched() {
        // Non-caption paragraph after image
        let out = run(vec![
            img("a.png"),
            p(vec![Node::text("see "), Node::element(Element::new("a"))]),
        ]);
        assert_eq!(out.len(), 2);
        assert!(out[0].is_tag("img"));

        // Extra text between image and emphasis
        let out = run(vec![p(vec![img("a.png"), Node::text(" and "), em("cap")])]);
        assert_eq!(out.len(), 1);
        let para = out[0].as_tag("p").unwrap();
        assert_eq!(para.children.len(), 3);
    }

    #[test]
    fn test_nested_containers() {
        let out = run(vec![Node::element(
            Element::new("blockquote").with_children(vec![
                p(vec![img("q.png"), Node::text("\n"), em("quoted")]),
            ]),
        )]);
        let quote = out[0].as_tag("blockquote").unwrap();
        let figure = quote.children[0].as_tag("figure").unwrap();
        assert!(figure.has_class("image-caption"));
        assert_eq!(figure.children[1].as_tag("figcaption").unwrap().text_content(), "quoted");
    }

    #[test]
    fn test_every_node_appears_once() {
        let out = run(vec![
            p(vec![Node::text("one")]),
            img("a.png"),
            p(vec![Node::text("cap a")]),
            img("b.png"),
            p(vec![Node::text("cap b")]),
            p(vec![Node::text("two")]),
        ]);
        let html = render_nodes(&out);
        assert_eq!(html.matches("<figure").count(), 2);
        assert_eq!(html.matches("cap a").count(), 1);
        assert_eq!(html.matches("cap b").count(), 1);
        assert!(html.starts_with("<p>one</p>"));
        assert!(html.ends_with("<p>two</p>"));
    }
}
