//! `kiroku new`: scaffold a draft post.
//!
//! Missing slug and title are asked for on stdin; in that case the
//! optional fields and tags are asked for too, with the tags already used
//! in the collection listed for reuse.

use crate::{
    cli::NewArgs,
    config::SiteConfig,
    content::{collect_files, merge_tag},
    log,
    markdown::extract_frontmatter,
    utils::date::DateTimeUtc,
};
use anyhow::{Context, Result, bail};
use regex::Regex;
use std::{
    fs::{self, OpenOptions},
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    sync::LazyLock,
};

/// Fields of the post to create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub og_image: String,
    pub tags: Vec<String>,
}

/// Create the post file, prompting on the terminal for missing fields.
pub fn new_post(config: &SiteConfig, args: &NewArgs) -> Result<PathBuf> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stderr();
    new_post_with(config, args, &mut input, &mut output)
}

pub fn new_post_with(
    config: &SiteConfig,
    args: &NewArgs,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<PathBuf> {
    let dir = config.collection_dir(config.default_collection());
    let existing = existing_tags(&dir);
    let post = collect_post(args, &existing, input, output)?;

    let path = dir.join(format!("{}.md", post.slug));
    if path.exists() {
        bail!("already exists: {}", display_path(config, &path));
    }

    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(frontmatter(&post, DateTimeUtc::now()).as_bytes())?;

    log!("new"; "created {}", display_path(config, &path));
    Ok(path)
}

fn collect_post(
    args: &NewArgs,
    existing: &[String],
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<NewPost> {
    let interactive = args.slug.is_none() || args.title.is_none();

    let slug = match &args.slug {
        Some(raw) => sanitize_slug(raw)
            .with_context(|| format!("invalid slug `{raw}`: use letters, digits and `-`"))?,
        None => loop {
            let raw = prompt(input, output, "slug (required)")?;
            match sanitize_slug(&raw) {
                Some(slug) => break slug,
                None => writeln!(output, "invalid slug: use letters, digits and `-` only")?,
            }
        },
    };

    let title = match &args.title {
        Some(title) if !title.trim().is_empty() => title.trim().to_owned(),
        Some(_) => bail!("title must not be empty"),
        None => loop {
            let title = prompt(input, output, "title (required)")?;
            if !title.is_empty() {
                break title;
            }
            writeln!(output, "title is required")?;
        },
    };

    let description = match &args.description {
        Some(description) => description.trim().to_owned(),
        None if interactive => prompt(input, output, "description")?,
        None => String::new(),
    };

    let og_image = match &args.og_image {
        Some(og_image) => og_image.trim().to_owned(),
        None if interactive => prompt(input, output, "ogImage (optional, URL)")?,
        None => String::new(),
    };

    let mut tags = Vec::new();
    for tag in &args.tags {
        merge_tag(&mut tags, reuse_spelling(existing, tag));
    }
    if interactive {
        if !existing.is_empty() {
            writeln!(output, "existing tags: {}", existing.join(", "))?;
        }
        let typed = prompt(input, output, "tags (comma separated)")?;
        for tag in typed.split(',') {
            merge_tag(&mut tags, reuse_spelling(existing, tag));
        }
    }

    Ok(NewPost {
        slug,
        title,
        description,
        og_image,
        tags,
    })
}

/// Print `label: ` and read one trimmed line. End of input is an error.
fn prompt(input: &mut impl BufRead, output: &mut impl Write, label: &str) -> Result<String> {
    write!(output, "{label}: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("no input for `{label}` (stdin closed)");
    }
    Ok(line.trim().to_owned())
}

/// Spaces become `-`; anything but ASCII letters, digits and `-` is rejected.
pub fn sanitize_slug(raw: &str) -> Option<String> {
    static RE_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").unwrap());

    let slug = raw.trim().replace(' ', "-");
    if slug.is_empty() || slug.contains("..") || slug.contains('/') || slug.contains('\\') {
        return None;
    }
    RE_SLUG.is_match(&slug).then_some(slug)
}

/// The spelling already used in the collection, if any.
fn reuse_spelling<'a>(existing: &'a [String], tag: &'a str) -> &'a str {
    let lower = tag.trim().to_lowercase();
    existing
        .iter()
        .find(|t| t.to_lowercase() == lower)
        .map_or(tag, String::as_str)
}

/// Tags of every post in `dir`, sorted case-insensitively.
///
/// Files with broken frontmatter are skipped; they are not being built here.
fn existing_tags(dir: &Path) -> Vec<String> {
    let mut tags = Vec::new();
    for path in collect_files(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        if let Ok(Some((meta, _))) = extract_frontmatter(&content) {
            for tag in &meta.tags {
                merge_tag(&mut tags, tag);
            }
        }
    }
    tags.sort_by_key(|t| t.to_lowercase());
    tags
}

/// YAML frontmatter plus an empty body.
///
/// Strings are written as JSON literals, which YAML reads as double-quoted
/// scalars with the same escapes.
pub fn frontmatter(post: &NewPost, today: DateTimeUtc) -> String {
    let quote = |s: &str| serde_json::Value::from(s).to_string();

    let mut lines = vec!["---".to_owned(), format!("title: {}", quote(&post.title))];
    if !post.description.is_empty() {
        lines.push(format!("description: {}", quote(&post.description)));
    }
    lines.push(format!("date: {}", quote(&today.to_ymd())));
    lines.push("draft: true".to_owned());
    if !post.og_image.is_empty() {
        lines.push(format!("ogImage: {}", quote(&post.og_image)));
    }
    let tags: Vec<_> = post.tags.iter().map(|t| quote(t)).collect();
    lines.push(format!("tags: [{}]", tags.join(", ")));
    lines.extend(["---".to_owned(), String::new(), String::new()]);
    lines.join("\n")
}

fn display_path(config: &SiteConfig, path: &Path) -> String {
    path.strip_prefix(&config.root)
        .unwrap_or(path)
        .display()
        .to_string()
}
