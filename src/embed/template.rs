//! Template types for typed variable injection.

use std::marker::PhantomData;

/// Trait for template variable sets.
pub trait TemplateVars {
    /// `(placeholder, value)` pairs. Values are inserted verbatim, so callers
    /// escape them for the context they land in.
    fn pairs(&self) -> Vec<(&'static str, &str)>;

    fn apply(&self, content: &str) -> String {
        fill(content, &self.pairs())
    }
}

/// Template with typed variable injection.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }

    /// Template text without the file's trailing newline.
    pub fn content(&self) -> &'static str {
        self.content.trim_end_matches(['\r', '\n'])
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content())
    }
}

/// Replace placeholders in one left-to-right scan.
///
/// Inserted values are never re-scanned, so a value that happens to contain
/// another placeholder is emitted as-is. When two placeholders start at the
/// same offset the longer one wins.
pub fn fill(content: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(content.len() + 256);
    let mut rest = content;

    loop {
        let next = pairs
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .filter_map(|&(key, value)| rest.find(key).map(|pos| (pos, key, value)))
            .min_by(|a, b| a.0.cmp(&b.0).then(b.1.len().cmp(&a.1.len())));

        match next {
            Some((pos, key, value)) => {
                out.push_str(&rest[..pos]);
                out.push_str(value);
                rest = &rest[pos + key.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}
