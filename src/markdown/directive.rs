//! Leaf directive parsing.
//!
//! A paragraph made of a single `::name[content]{#id .class key="value"}`
//! marker becomes a `Directive` node. Inline (`:name`) and container
//! (`:::name`) forms are not recognised; they stay ordinary text.

use rustc_hash::FxHashMap;

/// Parsed arguments of a directive: `[content]{#id .class key="value"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveArgs {
    /// Content from brackets (empty if not provided).
    pub content: String,
    /// `{#id}`
    pub id: Option<String>,
    /// `{.a .b}`
    pub classes: Vec<String>,
    /// `{key="value" key='value' key=value}`
    pub attrs: FxHashMap<String, String>,
}

impl DirectiveArgs {
    /// Parse content and the attribute string (without braces).
    pub fn parse(content: &str, attrs_str: &str) -> Self {
        let mut args = Self {
            content: content.to_owned(),
            ..Default::default()
        };

        let mut remaining = attrs_str.trim();

        while !remaining.is_empty() {
            if let Some(rest) = remaining.strip_prefix('#') {
                let end = token_end(rest);
                args.id = Some(rest[..end].to_owned());
                remaining = &rest[end..];
            } else if let Some(rest) = remaining.strip_prefix('.') {
                let end = token_end(rest);
                args.classes.push(rest[..end].to_owned());
                remaining = &rest[end..];
            } else if let Some((key, value, rest)) = parse_key_value(remaining) {
                args.attrs.insert(key.to_owned(), value.to_owned());
                remaining = rest;
            } else {
                // Skip one unrecognized character
                let skip = remaining.chars().next().map_or(1, char::len_utf8);
                remaining = &remaining[skip..];
            }
            remaining = remaining.trim_start();
        }

        args
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

#[inline]
fn token_end(s: &str) -> usize {
    s.find(|c: char| c.is_whitespace() || c == '.' || c == '#')
        .unwrap_or(s.len())
}

/// `key="value"`, `key='value'` or `key=value`.
fn parse_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let eq_pos = s.find('=')?;
    let key = s[..eq_pos].trim();

    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }

    let after_eq = &s[eq_pos + 1..];

    for quote in ['"', '\''] {
        if let Some(stripped) = after_eq.strip_prefix(quote) {
            let end_quote = stripped.find(quote)?;
            return Some((key, &stripped[..end_quote], &stripped[end_quote + 1..]));
        }
    }

    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
    Some((key, &after_eq[..end], &after_eq[end..]))
}

/// Parse a whole paragraph as a leaf directive.
///
/// Returns `None` unless the trimmed text is exactly one `::name...` marker
/// with nothing after it.
pub fn parse_leaf(text: &str) -> Option<(String, DirectiveArgs)> {
    let line = text.trim();
    let after_colons = line.strip_prefix("::")?;
    if after_colons.starts_with(':') {
        return None;
    }

    let name_end = after_colons
        .find(|c: char| c == '[' || c == '{' || c.is_whitespace())
        .unwrap_or(after_colons.len());
    let name = &after_colons[..name_end];
    if !is_valid_directive_name(name) {
        return None;
    }

    let rest = &after_colons[name_end..];
    let (content, consumed) = match_delimited(rest, '[', ']')?;
    let rest = &rest[consumed..];
    let (attrs, consumed) = match_delimited(rest, '{', '}')?;

    if !rest[consumed..].trim().is_empty() {
        return None;
    }

    Some((name.to_owned(), DirectiveArgs::parse(content, attrs)))
}

/// Valid names contain only alphanumerics, hyphens, and underscores.
fn is_valid_directive_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Match `open ... close` with nesting at the start of `s`.
///
/// Returns `(inner, bytes_consumed)`; an absent group is `("", 0)`,
/// an unterminated one is `None`.
fn match_delimited(s: &str, open: char, close: char) -> Option<(&str, usize)> {
    if !s.starts_with(open) {
        return Some(("", 0));
    }

    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some((&s[1..i], i + 1));
            }
        }
    }
    None
}
