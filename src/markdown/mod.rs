//! Markdown front end: frontmatter, leaf directives, and tree conversion.

pub mod convert;
pub mod directive;
pub mod meta;

pub use convert::{MarkdownOptions, from_markdown};
pub use meta::{PostMeta, extract_frontmatter};
