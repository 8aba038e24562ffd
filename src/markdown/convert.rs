//! Markdown to document tree conversion using pulldown-cmark.
//!
//! Besides the usual CommonMark mapping:
//! - a paragraph whose whole source is a leaf directive becomes a
//!   `Node::Directive`
//! - image alt text is folded into the `alt` attribute, so `img` stays a leaf
//! - HTML blocks are parsed with `tl` so transforms can see their elements

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};

use super::directive;
use crate::utils::html::unescape;
use crate::vdom::{Attrs, Directive, Document, Element, Node, PageSeed};

/// Options for markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    /// `# Heading {#custom-id}`
    pub heading_attributes: bool,
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
        }
    }

    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// Markdown to document converter
struct MarkdownConverter<'s> {
    source: &'s str,
    /// Open elements; `frames` of an entry is how many stack slots its end tag pops.
    stack: Vec<(Element, usize)>,
    root_children: Vec<Node>,
    /// Accumulated `Event::Html` lines of the current HTML block.
    html_block: Option<String>,
    /// Nesting depth of events being dropped (directive paragraph, metadata).
    skip_depth: usize,
    in_table_head: bool,
}

impl<'s> MarkdownConverter<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            stack: Vec::new(),
            root_children: Vec::new(),
            html_block: None,
            skip_depth: 0,
            in_table_head: false,
        }
    }

    fn convert(mut self, options: &MarkdownOptions, seed: PageSeed) -> Document {
        let parser = Parser::new_ext(self.source, options.to_pulldown_options());

        for (event, range) in parser.into_offset_iter() {
            if self.skip_depth > 0 {
                match event {
                    Event::Start(_) => self.skip_depth += 1,
                    Event::End(_) => self.skip_depth -= 1,
                    _ => {}
                }
                continue;
            }

            if let Event::Start(Tag::Paragraph) = &event
                && let Some(node) = leaf_directive(&self.source[range])
            {
                self.add_node(node);
                self.skip_depth = 1;
                continue;
            }

            self.handle_event(event);
        }

        let root = Element::new("article").with_children(self.root_children);
        Document::new(root, seed)
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.add_text(&text),
            Event::Code(code) => {
                let elem = Element::new("code").with_child(Node::text(&*code));
                self.add_node(Node::element(elem));
            }
            Event::Html(html) => match self.html_block.as_mut() {
                Some(block) => block.push_str(&html),
                None => self.add_html_block(&html),
            },
            Event::InlineHtml(html) => self.add_node(Node::Raw(html.into_string())),
            Event::SoftBreak => self.add_text("\n"),
            Event::HardBreak => self.add_node(Node::element(Element::new("br"))),
            Event::Rule => self.add_node(Node::element(Element::new("hr"))),
            Event::FootnoteReference(name) => self.add_footnote_ref(&name),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", "");
                if checked {
                    input.set_attr("checked", "");
                }
                self.add_node(Node::element(input));
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.add_node(Node::element(
                    Element::new("code")
                        .with_attr("class", "math")
                        .with_child(Node::text(&*math)),
                ));
            }
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::HtmlBlock => self.html_block = Some(String::new()),
            Tag::MetadataBlock(_) => self.skip_depth = 1,
            Tag::CodeBlock(kind) => {
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(lang) = kind
                    && let Some(lang) = lang.split_whitespace().next()
                {
                    code.set_attr("class", format!("language-{lang}"));
                }
                self.stack.push((Element::new("pre"), 0));
                self.stack.push((code, 2));
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.stack.push((Element::new("thead"), 0));
                self.stack.push((Element::new("tr"), 2));
            }
            Tag::TableCell if self.in_table_head => self.stack.push((Element::new("th"), 1)),
            tag => self.stack.push((tag_to_element(tag), 1)),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::HtmlBlock => {
                if let Some(block) = self.html_block.take() {
                    self.add_html_block(&block);
                }
                return;
            }
            TagEnd::TableHead => self.in_table_head = false,
            _ => {}
        }

        let Some((elem, frames)) = self.stack.pop() else {
            return;
        };
        let elem = finish_element(elem);
        if frames == 2
            && let Some((mut outer, _)) = self.stack.pop()
        {
            outer.children.push(Node::element(elem));
            self.add_node(Node::element(outer));
        } else {
            self.add_node(Node::element(elem));
        }
    }

    /// Add text, merging with a preceding text node.
    fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let children = self.current_children();
        if let Some(Node::Text(prev)) = children.last_mut() {
            prev.push_str(text);
        } else {
            children.push(Node::text(text));
        }
    }

    /// Parse an HTML block with tl so its elements take part in transforms.
    fn add_html_block(&mut self, html: &str) {
        let lower = html.to_ascii_lowercase();
        // tl does not treat script/style bodies as raw text
        if lower.contains("<script") || lower.contains("<style") {
            self.add_node(Node::Raw(html.to_owned()));
            return;
        }

        let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
            self.add_node(Node::Raw(html.to_owned()));
            return;
        };

        let parser = dom.parser();
        for handle in dom.children() {
            match tl_node_to_vdom(*handle, parser) {
                Some(Node::Text(text)) if text.trim().is_empty() => {}
                Some(node) => self.add_node(node),
                None => {}
            }
        }
    }

    fn add_footnote_ref(&mut self, name: &str) {
        let link = Element::new("a")
            .with_attr("href", format!("#fn-{name}"))
            .with_attr("id", format!("fnref-{name}"))
            .with_child(Node::text(format!("[{name}]")));
        let sup = Element::new("sup")
            .with_attr("class", "footnote-ref")
            .with_child(Node::element(link));
        self.add_node(Node::element(sup));
    }

    fn current_children(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some((elem, _)) => &mut elem.children,
            None => &mut self.root_children,
        }
    }

    /// Add a node to current context (top of stack or root)
    fn add_node(&mut self, node: Node) {
        self.current_children().push(node);
    }
}

/// Turn a paragraph's source into a directive node if it is one.
fn leaf_directive(source: &str) -> Option<Node> {
    let (name, args) = directive::parse_leaf(source)?;
    Some(Node::Directive(Box::new(Directive {
        name,
        args,
        source: source.trim().to_owned(),
    })))
}

/// Fold image alt children into the `alt` attribute.
fn finish_element(mut elem: Element) -> Element {
    if elem.tag == "img" {
        let alt = elem.text_content();
        elem.children.clear();
        elem.set_attr("alt", alt);
    }
    elem
}

fn tl_node_to_vdom(handle: tl::NodeHandle, parser: &tl::Parser) -> Option<Node> {
    match handle.get(parser)? {
        tl::Node::Tag(tag) => {
            let name = tag.name().as_utf8_str().to_ascii_lowercase();

            let attrs: Attrs = tag
                .attributes()
                .iter()
                .map(|(key, value)| {
                    let value = value.map(|v| unescape(&v).into_owned()).unwrap_or_default();
                    (key.to_string(), value)
                })
                .collect();

            let children = tag
                .children()
                .top()
                .iter()
                .filter_map(|child| tl_node_to_vdom(*child, parser))
                .collect();

            Some(Node::element(
                Element::new(name).with_attrs(attrs).with_children(children),
            ))
        }
        tl::Node::Raw(bytes) => Some(Node::text(unescape(&bytes.as_utf8_str()).into_owned())),
        tl::Node::Comment(_) => None,
    }
}

/// Convert pulldown-cmark Tag to an empty element
fn tag_to_element(tag: Tag) -> Element {
    match tag {
        Tag::Paragraph => Element::new("p"),
        Tag::Heading { level, id, .. } => {
            let mut elem = Element::new(heading_level_to_tag(level));
            if let Some(id) = id {
                elem.set_attr("id", id.into_string());
            }
            elem
        }
        Tag::BlockQuote(_) => Element::new("blockquote"),
        Tag::List(Some(start)) if start != 1 => {
            Element::new("ol").with_attr("start", start.to_string())
        }
        Tag::List(Some(_)) => Element::new("ol"),
        Tag::List(None) => Element::new("ul"),
        Tag::Item => Element::new("li"),
        Tag::FootnoteDefinition(name) => Element::new("div")
            .with_attr("class", "footnote")
            .with_attr("id", format!("fn-{name}")),

        Tag::Table(_) => Element::new("table"),
        Tag::TableRow => Element::new("tr"),
        Tag::TableCell => Element::new("td"),

        Tag::Emphasis => Element::new("em"),
        Tag::Strong => Element::new("strong"),
        Tag::Strikethrough => Element::new("del"),
        Tag::Superscript => Element::new("sup"),
        Tag::Subscript => Element::new("sub"),
        Tag::Link {
            link_type,
            dest_url,
            title,
            ..
        } => {
            let href = match link_type {
                LinkType::Email => format!("mailto:{dest_url}"),
                _ => dest_url.into_string(),
            };
            let mut elem = Element::new("a").with_attr("href", href);
            if !title.is_empty() {
                elem.set_attr("title", title.into_string());
            }
            elem
        }
        Tag::Image {
            dest_url, title, ..
        } => {
            let mut elem = Element::new("img").with_attr("src", dest_url.into_string());
            if !title.is_empty() {
                elem.set_attr("title", title.into_string());
            }
            elem
        }

        Tag::DefinitionList => Element::new("dl"),
        Tag::DefinitionListTitle => Element::new("dt"),
        Tag::DefinitionListDefinition => Element::new("dd"),

        // Handled in start_tag
        Tag::CodeBlock(_) | Tag::TableHead | Tag::HtmlBlock | Tag::MetadataBlock(_) => {
            Element::new("div")
        }
    }
}

fn heading_level_to_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

/// Convert a markdown body into a document.
pub fn from_markdown(markdown: &str, options: &MarkdownOptions, seed: PageSeed) -> Document {
    MarkdownConverter::new(markdown).convert(options, seed)
}
