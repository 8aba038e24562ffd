//! `::github{repo="owner/name"}` and `::github{user="owner"}` cards.
//!
//! A matching directive is replaced by a card whose inline script fills in
//! live data from the GitHub API. Directives whose target does not validate
//! are left in place and render as the author wrote them.

use super::target::{EmbedTarget, normalize_github_target};
use crate::embed::github::{CardVars, REPO_CARD_HTML, USER_CARD_HTML};
use crate::utils::html::{escape, script_json};
use crate::vdom::{Directive, Document, Element, Node, PageSeed, Transform};

const DIRECTIVE_NAME: &str = "github";

/// Replaces `github` directives with repository or user cards.
pub struct GithubCardTransform;

impl Transform for GithubCardTransform {
    fn transform(self, mut doc: Document) -> Document {
        let mut ids = CardIds::new(doc.seed);
        replace_cards(&mut doc.root, &mut ids);
        doc
    }
}

/// `GC-<seed>-<n>` ids, numbered in document order.
struct CardIds {
    seed: String,
    count: usize,
}

impl CardIds {
    fn new(seed: PageSeed) -> Self {
        Self {
            seed: seed.to_hex(),
            count: 0,
        }
    }

    fn next_id(&mut self) -> String {
        self.count += 1;
        format!("GC-{}-{}", self.seed, self.count)
    }
}

fn replace_cards(parent: &mut Element, ids: &mut CardIds) {
    for child in &mut parent.children {
        let card = match child {
            Node::Directive(directive) if directive.name == DIRECTIVE_NAME => {
                render_card(directive, ids)
            }
            Node::Element(elem) => {
                replace_cards(elem, ids);
                None
            }
            _ => None,
        };

        if let Some(html) = card {
            *child = Node::Raw(html);
        }
    }
}

fn render_card(directive: &Directive, ids: &mut CardIds) -> Option<String> {
    let raw = directive
        .args
        .get("repo")
        .filter(|repo| !repo.is_empty())
        .or_else(|| directive.args.get("user"));

    let Some(target) = raw.and_then(normalize_github_target) else {
        crate::debug!("github"; "left `{}` as text: no valid repo or user", directive.source);
        return None;
    };

    let template = match target {
        EmbedTarget::Repo { .. } => REPO_CARD_HTML,
        EmbedTarget::User { .. } => USER_CARD_HTML,
        EmbedTarget::Tweet { .. } => return None,
    };

    let id = ids.next_id();
    let canonical = target.canonical();
    Some(template.render(&CardVars {
        id_html: escape(&id).into_owned(),
        id_json: script_json(&id),
        target_html: escape(&canonical).into_owned(),
        target_json: script_json(&canonical),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::directive::DirectiveArgs;
    use crate::markdown::{MarkdownOptions, from_markdown};
    use crate::vdom::render::render_nodes;

    fn compile(markdown: &str) -> (Document, String) {
        let seed = PageSeed::from_path("blog/hello");
        let doc = from_markdown(markdown, &MarkdownOptions::all(), seed);
        let doc = GithubCardTransform.transform(doc);
        let html = render_nodes(&doc.root.children);
        (doc, html)
    }

    fn directive(attrs: &str) -> Node {
        Node::Directive(Box::new(Directive {
            name: DIRECTIVE_NAME.into(),
            args: DirectiveArgs::parse("", attrs),
            source: format!("::github{{{attrs}}}"),
        }))
    }

    #[test]
    fn test_repo_card() {
        let (doc, html) = compile("intro\n\n::github{repo=\"rust-lang/rust\"}\n\noutro");
        let id = format!("GC-{}-1", doc.seed.to_hex());

        assert!(html.starts_with("<p>intro</p>"));
        assert!(html.ends_with("<p>outro</p>"));
        assert!(html.contains(&format!(
            r#"<div id="{id}" class="github-card gh-loading not-prose">"#
        )));
        assert!(html.contains(
            r#"<a class="gh-text" href="https://github.com/rust-lang/rust" rel="noopener noreferrer">rust-lang/rust</a>"#
        ));
        assert!(html.contains(r#"const repo = "rust-lang/rust";"#));
        assert!(html.contains(&format!(r#"document.getElementById("{id}")"#)));
        assert!(html.contains(r#"<span class="gh-stars">00K</span>"#));
    }

    #[test]
    fn test_url_target_is_normalized() {
        let (_, html) = compile("::github{repo=\"https://github.com/rust-lang/rust/tree/master\"}");
        assert!(html.contains(r#"href="https://github.com/rust-lang/rust""#));
        assert!(!html.contains("tree/master"));
    }

    #[test]
    fn test_user_card() {
        let (_, html) = compile("::github{user=octocat}");
        assert!(html.contains("github-card gh-simple gh-loading not-prose"));
        assert!(html.contains(r#"const user = "octocat";"#));
        assert!(html.contains(r#"<span class="gh-followers">00K</span>"#));
        assert!(!html.contains("gh-description"));
    }

    #[test]
    fn test_empty_repo_falls_back_to_user() {
        let (_, html) = compile("::github{repo=\"\" user=\"octocat\"}");
        assert!(html.contains("gh-simple"));
    }

    #[test]
    fn test_invalid_target_is_left_literal() {
        let (doc, html) = compile("::github{repo=\"not a repo\"}");
        assert!(matches!(doc.root.children[0], Node::Directive(_)));
        assert_eq!(html, "<p>::github{repo=&quot;not a repo&quot;}</p>");

        let (_, html) = compile("::github{}");
        assert_eq!(html, "<p>::github{}</p>");
    }

    #[test]
    fn test_other_directives_are_ignored() {
        let (doc, _) = compile("::gitlab{repo=\"a/b\"}");
        assert!(matches!(doc.root.children[0], Node::Directive(_)));
    }

    #[test]
    fn test_ids_are_unique_and_stable() {
        let markdown = "::github{repo=a/b}\n\n::github{repo=c/d}";
        let (doc, first) = compile(markdown);
        let (_, second) = compile(markdown);
        let seed = doc.seed.to_hex();

        assert_eq!(first, second);
        assert!(first.contains(&format!(r#"id="GC-{seed}-1""#)));
        assert!(first.contains(&format!(r#"id="GC-{seed}-2""#)));
    }

    #[test]
    fn test_nested_directive() {
        let quote = Element::new("blockquote").with_child(directive("repo=\"a/b\""));
        let doc = Document::new(
            Element::new("article").with_child(Node::element(quote)),
            PageSeed::default(),
        );
        let doc = GithubCardTransform.transform(doc);

        let quote = doc.root.children[0].as_tag("blockquote").unwrap();
        let Node::Raw(html) = &quote.children[0] else {
            panic!("expected card, got {:?}", quote.children[0]);
        };
        assert!(html.contains(r#"id="GC-00000000-1""#));
    }
}
