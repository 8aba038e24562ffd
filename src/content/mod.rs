//! Content collections: markdown posts under `<content>/<collection>/`.
//!
//! Each file becomes an [`Entry`] with validated frontmatter. Drafts are
//! dropped unless drafts are enabled, and entries come back newest first.

use crate::config::SiteConfig;
use crate::markdown::{PostMeta, extract_frontmatter};
use crate::utils::date::DateTimeUtc;
use jwalk::WalkDir;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Errors while loading a single post.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: missing frontmatter", .0.display())]
    MissingFrontmatter(PathBuf),

    #[error("{}: {message}", path.display())]
    Frontmatter { path: PathBuf, message: String },

    #[error("{}: missing required field `{field}`", path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{}: invalid date `{value}` (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SSZ)", path.display())]
    InvalidDate { path: PathBuf, value: String },
}

/// A loaded post.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub collection: String,
    /// Path below the collection directory, `/`-separated, no extension.
    pub id: String,
    pub path: PathBuf,
    pub title: String,
    pub description: String,
    pub date: DateTimeUtc,
    pub draft: bool,
    pub og_image: Option<String>,
    pub tags: Vec<String>,
    pub body: String,
}

impl Entry {
    /// `<collection>/<id>`, the OG cache key and output subpath.
    pub fn key(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }

    /// Site-relative page URL, `/<collection>/<id>/`.
    pub fn permalink(&self) -> String {
        format!("/{}/", self.key())
    }

    /// Parse a post file.
    pub fn load(collection: &str, dir: &Path, path: &Path) -> Result<Self, ContentError> {
        let content = fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(collection, entry_id(dir, path), path, &content)
    }

    fn parse(
        collection: &str,
        id: String,
        path: &Path,
        content: &str,
    ) -> Result<Self, ContentError> {
        let (meta, body) = extract_frontmatter(content)
            .map_err(|e| ContentError::Frontmatter {
                path: path.to_path_buf(),
                message: format!("{e:#}"),
            })?
            .ok_or_else(|| ContentError::MissingFrontmatter(path.to_path_buf()))?;

        let PostMeta {
            title,
            description,
            date,
            draft,
            og_image,
            tags,
        } = meta;

        let missing = |field| ContentError::MissingField {
            path: path.to_path_buf(),
            field,
        };
        let title = title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| missing("title"))?;
        let raw_date = date.ok_or_else(|| missing("date"))?;
        let date = DateTimeUtc::parse(&raw_date).ok_or_else(|| ContentError::InvalidDate {
            path: path.to_path_buf(),
            value: raw_date,
        })?;

        Ok(Self {
            collection: collection.to_owned(),
            id,
            path: path.to_path_buf(),
            title,
            description: description.unwrap_or_default(),
            date,
            draft,
            og_image: og_image.filter(|s| !s.trim().is_empty()),
            tags,
            body: body.to_owned(),
        })
    }
}

/// Entry id for `path` inside `dir`: `a/b.md` → `a/b`, `a/index.md` → `a`.
pub fn entry_id(dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(dir).unwrap_or(path).with_extension("");
    let id = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    match id.strip_suffix("/index") {
        Some(parent) => parent.to_owned(),
        None => id,
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
}

/// All markdown files below `dir`, sorted. A missing directory is empty.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| is_markdown(p))
        .collect();
    files.sort();
    files
}

/// Load one collection in parallel. All failures are reported, not just the first.
pub fn load_collection(
    config: &SiteConfig,
    collection: &str,
) -> Result<Vec<Entry>, Vec<ContentError>> {
    let dir = config.collection_dir(collection);
    let (entries, errors): (Vec<_>, Vec<_>) = collect_files(&dir)
        .par_iter()
        .map(|path| Entry::load(collection, &dir, path))
        .partition(Result::is_ok);

    if errors.is_empty() {
        Ok(entries.into_iter().filter_map(Result::ok).collect())
    } else {
        Err(errors.into_iter().filter_map(Result::err).collect())
    }
}

/// Load every configured collection, newest first.
///
/// Drafts are kept only when `[build] drafts` is set. Ties are broken by
/// collection then id so the order is stable.
pub fn load_collections(config: &SiteConfig) -> anyhow::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut errors = Vec::new();

    for collection in &config.build.collections {
        match load_collection(config, collection) {
            Ok(loaded) => {
                crate::debug!("content"; "{}: {} files", collection, loaded.len());
                entries.extend(loaded);
            }
            Err(errs) => errors.extend(errs),
        }
    }

    if !errors.is_empty() {
        for err in &errors {
            crate::log!("error"; "{err}");
        }
        anyhow::bail!("{} post(s) failed to load", errors.len());
    }

    if !config.build.drafts {
        entries.retain(|e| !e.draft);
    }
    sort_entries(&mut entries);
    Ok(entries)
}

pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.collection.cmp(&b.collection))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Every tag used in `entries`, first spelling wins, in first-seen order.
pub fn collect_tags<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Vec<String> {
    let mut tags = Vec::new();
    for tag in entries.into_iter().flat_map(|e| &e.tags) {
        merge_tag(&mut tags, tag);
    }
    tags
}

/// Add `tag` unless a case-insensitive match is already present.
pub fn merge_tag(tags: &mut Vec<String>, tag: &str) {
    let tag = tag.trim();
    if tag.is_empty() {
        return;
    }
    let lower = tag.to_lowercase();
    if !tags.iter().any(|t| t.to_lowercase() == lower) {
        tags.push(tag.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn post(title: &str, date: &str, extra: &str) -> String {
        format!("---\ntitle: {title}\ndate: {date}\n{extra}---\nbody of {title}\n")
    }

    fn site(dir: &TempDir, extra: &str) -> SiteConfig {
        let mut config = test_parse_config(extra);
        config.finalize(dir.path().join("kiroku.toml"));
        config
    }

    #[test]
    fn test_entry_id() {
        let dir = Path::new("/c/blog");
        assert_eq!(entry_id(dir, Path::new("/c/blog/hello.md")), "hello");
        assert_eq!(entry_id(dir, Path::new("/c/blog/2024/trip.markdown")), "2024/trip");
        assert_eq!(entry_id(dir, Path::new("/c/blog/series/index.md")), "series");
    }

    #[test]
    fn test_parse_entry() {
        let content = post("Hello", "2024-06-15", "description: desc\nogImage: /og.png\ntags: [a]\n");
        let entry = Entry::parse("blog", "hello".into(), Path::new("hello.md"), &content).unwrap();

        assert_eq!(entry.title, "Hello");
        assert_eq!(entry.description, "desc");
        assert_eq!(entry.date, DateTimeUtc::from_ymd(2024, 6, 15));
        assert_eq!(entry.og_image.as_deref(), Some("/og.png"));
        assert_eq!(entry.body, "body of Hello\n");
        assert_eq!(entry.key(), "blog/hello");
        assert_eq!(entry.permalink(), "/blog/hello/");
    }

    #[test]
    fn test_parse_errors() {
        let path = Path::new("x.md");
        let parse = |content: &str| Entry::parse("blog", "x".into(), path, content).unwrap_err();

        assert!(matches!(parse("# no frontmatter"), ContentError::MissingFrontmatter(_)));
        assert!(matches!(
            parse("---\ndate: 2024-01-01\n---\n"),
            ContentError::MissingField { field: "title", .. }
        ));
        assert!(matches!(
            parse("---\ntitle: a\n---\n"),
            ContentError::MissingField { field: "date", .. }
        ));
        assert!(matches!(
            parse("---\ntitle: a\ndate: yesterday\n---\n"),
            ContentError::InvalidDate { .. }
        ));
        assert!(matches!(parse("---\ntitle: [a\n---\n"), ContentError::Frontmatter { .. }));
    }

    #[test]
    fn test_collect_files_filters_extensions() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.md", "");
        write(dir.path(), "a/c.markdown", "");
        write(dir.path(), "image.png", "");

        let files = collect_files(dir.path());
        assert_eq!(files, [dir.path().join("a/c.markdown"), dir.path().join("b.md")]);
        assert!(collect_files(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn test_load_collections_orders_and_filters_drafts() {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("src/content");
        write(&content, "blog/old.md", &post("Old", "2023-01-01", ""));
        write(&content, "blog/new.md", &post("New", "2024-03-01", ""));
        write(&content, "blog/wip.md", &post("Wip", "2025-01-01", "draft: true\n"));
        write(&content, "projects/tool.md", &post("Tool", "2024-03-01", ""));

        let entries = load_collections(&site(&dir, "")).unwrap();
        let keys: Vec<_> = entries.iter().map(Entry::key).collect();
        assert_eq!(keys, ["blog/new", "projects/tool", "blog/old"]);

        let entries = load_collections(&site(&dir, "[build]\ndrafts = true")).unwrap();
        assert_eq!(entries[0].key(), "blog/wip");
    }

    #[test]
    fn test_load_collections_reports_errors() {
        let dir = TempDir::new().unwrap();
        let content = dir.path().join("src/content");
        write(&content, "blog/ok.md", &post("Ok", "2024-01-01", ""));
        write(&content, "blog/bad.md", "---\ntitle: bad\n---\n");

        assert!(load_collections(&site(&dir, "")).is_err());
    }

    #[test]
    fn test_collect_tags_keeps_first_spelling() {
        let dir = Path::new("x.md");
        let a = Entry::parse("blog", "a".into(), dir, &post("A", "2024-01-01", "tags: [Rust, blog]\n")).unwrap();
        let b = Entry::parse("blog", "b".into(), dir, &post("B", "2024-01-01", "tags: [rust, Life]\n")).unwrap();
        assert_eq!(collect_tags([&a, &b]), ["Rust", "blog", "Life"]);
    }
}
