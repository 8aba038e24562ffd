//! Site building orchestration.
//!
//! Build phases:
//! - **Init** - clean (with `--clean`) and create the output directory
//! - **Load** - read every collection, drop drafts
//! - **Compile** - markdown → transforms → page shell, in parallel
//! - **Assets** - embed stylesheet, OG images, `public/` copy
//! - **Feed** - `rss.xml`

use crate::{
    config::SiteConfig,
    content::{self, Entry},
    embed::{
        css::{EMBEDS_CSS, EMBEDS_CSS_PATH},
        page::{POST_HTML, PostVars},
    },
    freshness::{copy_if_changed, write_if_changed},
    generator::{feed::build_feed, og},
    log,
    logger::ProgressLine,
    markdown::MarkdownOptions,
    pipeline,
    utils::html::escape,
};
use anyhow::{Context, Result, anyhow};
use jwalk::WalkDir;
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

/// Counts reported at the end of a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub posts: usize,
    pub written: usize,
    pub og_images: usize,
    pub public_files: usize,
}

/// Build the entire site.
pub fn build_site(config: &SiteConfig) -> Result<BuildSummary> {
    init_build(config)?;

    let entries = content::load_collections(config)?;
    let written = compile_entries(config, &entries)?;

    write_if_changed(&config.build.output.join(EMBEDS_CSS_PATH), EMBEDS_CSS.as_bytes())
        .context("Failed to write embed stylesheet")?;

    // Images are generated into public/ first so the copy below picks them up
    let og_images = og::build_og_images(config, &entries)?;
    let public_files = copy_public(config)?;

    build_feed(config, &entries)?;

    let summary = BuildSummary {
        posts: entries.len(),
        written,
        og_images,
        public_files,
    };
    log!(
        "build";
        "{} posts ({} changed), {} og images, {} public files → {}",
        summary.posts,
        summary.written,
        summary.og_images,
        summary.public_files,
        config.build.output.display()
    );
    Ok(summary)
}

/// Prepare the output directory.
fn init_build(config: &SiteConfig) -> Result<()> {
    let output = &config.build.output;
    if config.build.clean && output.exists() {
        crate::debug!("build"; "cleaning {}", output.display());
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clean {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))
}

/// Compile and write every entry in parallel. Returns how many pages changed.
fn compile_entries(config: &SiteConfig, entries: &[Entry]) -> Result<usize> {
    let options = MarkdownOptions::all();
    let progress = ProgressLine::new("build", &[("posts", entries.len())]);
    let has_error = AtomicBool::new(false);

    let written = entries
        .par_iter()
        .map(|entry| {
            if has_error.load(Ordering::Relaxed) {
                return Err(anyhow!("Aborted"));
            }
            let html = render_page(config, entry, &options);
            let path = page_path(config, entry);
            let changed = write_if_changed(&path, html.as_bytes()).map_err(|e| {
                if !has_error.swap(true, Ordering::Relaxed) {
                    log!("error"; "{}: {}", path.display(), e);
                }
                anyhow!("Build failed")
            })?;
            progress.inc("posts");
            Ok(usize::from(changed))
        })
        .sum::<Result<usize>>()?;

    progress.finish();
    Ok(written)
}

/// `<output>/<collection>/<id>/index.html`
fn page_path(config: &SiteConfig, entry: &Entry) -> PathBuf {
    config
        .build
        .output
        .join(&entry.collection)
        .join(&entry.id)
        .join("index.html")
}

/// Compile an entry's body and wrap it in the page shell.
pub fn render_page(config: &SiteConfig, entry: &Entry, options: &MarkdownOptions) -> String {
    let site = &config.site;
    let content = pipeline::compile(&entry.body, &entry.key(), options);
    let canonical = absolute_url(site.base_url(), &entry.permalink());
    let og_image = absolute_url(site.base_url(), &og::image_url(config, entry));
    let feed = format!("/{}", config.build.feed.path.to_string_lossy().replace('\\', "/"));

    POST_HTML.render(&PostVars {
        lang: escape(&site.language).into_owned(),
        title: escape(&entry.title).into_owned(),
        site_title: escape(&site.title).into_owned(),
        description: escape(&entry.description).into_owned(),
        canonical: escape(&canonical).into_owned(),
        feed: escape(&feed).into_owned(),
        og_image: escape(&og_image).into_owned(),
        stylesheet: format!("/{EMBEDS_CSS_PATH}"),
        date: entry.date.to_dotted(),
        datetime: entry.date.to_rfc3339(),
        tags: render_tags(&entry.tags),
        content,
    })
}

/// Prefix site-relative URLs with the site URL; absolute URLs pass through.
fn absolute_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") || !url.starts_with('/') {
        url.to_owned()
    } else {
        format!("{base_url}{url}")
    }
}

fn render_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let items: String = tags
        .iter()
        .map(|tag| format!("<li>{}</li>", escape(tag)))
        .collect();
    format!(r#"<ul class="post-tags">{items}</ul>"#)
}

/// Copy `public/` into the output verbatim. Returns how many files changed.
fn copy_public(config: &SiteConfig) -> Result<usize> {
    let public = &config.build.public;
    if !public.is_dir() {
        return Ok(0);
    }

    let files: Vec<PathBuf> = WalkDir::new(public)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect();

    let copied = files
        .par_iter()
        .map(|src| copy_public_file(public, src, &config.build.output))
        .sum::<Result<usize>>()?;

    crate::debug!("build"; "public: {} of {} files copied", copied, files.len());
    Ok(copied)
}

fn copy_public_file(public: &Path, src: &Path, output: &Path) -> Result<usize> {
    let rel = src.strip_prefix(public).unwrap_or(src);
    let dst = output.join(rel);
    let changed = copy_if_changed(src, &dst)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
    Ok(usize::from(changed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn site(dir: &TempDir) -> SiteConfig {
        let mut config = test_parse_config(
            "[site]\ntitle = \"Blog\"\nurl = \"https://blog.example.com\"\n[build.og]\nenable = false",
        );
        config.finalize(dir.path().join("kiroku.toml"));
        config
    }

    #[test]
    fn test_absolute_url() {
        let base = "https://blog.example.com";
        assert_eq!(absolute_url(base, "/blog/a/"), "https://blog.example.com/blog/a/");
        assert_eq!(absolute_url(base, "https://cdn.example.com/x.png"), "https://cdn.example.com/x.png");
        assert_eq!(absolute_url("", "/blog/a/"), "/blog/a/");
    }

    #[test]
    fn test_render_tags() {
        assert_eq!(render_tags(&[]), "");
        assert_eq!(
            render_tags(&["rust".into(), "a&b".into()]),
            r#"<ul class="post-tags"><li>rust</li><li>a&amp;b</li></ul>"#
        );
    }

    #[test]
    fn test_build_site() {
        let dir = TempDir::new().unwrap();
        let config = site(&dir);
        let content = dir.path().join("src/content");
        write(
            &content.join("blog/hello.md"),
            "---\ntitle: Hello <World>\ndescription: first post\ndate: 2024-06-15\ntags: [rust]\n---\n\n::github{repo=\"rust-lang/rust\"}\n\nhttps://x.com/a/status/1\n",
        );
        write(
            &content.join("blog/draft.md"),
            "---\ntitle: Draft\ndate: 2024-07-01\ndraft: true\n---\nwip\n",
        );
        write(
            &content.join("projects/tool/index.md"),
            "---\ntitle: Tool\ndate: 2023-01-01\nogImage: /custom.png\n---\ntool\n",
        );
        write(&dir.path().join("public/favicon.ico"), "icon");

        let summary = build_site(&config).unwrap();
        assert_eq!(
            summary,
            BuildSummary {
                posts: 2,
                written: 2,
                og_images: 0,
                public_files: 1,
            }
        );

        let out = dir.path().join("dist");
        let page = fs::read_to_string(out.join("blog/hello/index.html")).unwrap();
        assert!(page.contains("<title>Hello &lt;World&gt; | Blog</title>"));
        assert!(page.contains(r#"<link rel="canonical" href="https://blog.example.com/blog/hello/">"#));
        assert!(page.contains(r#"content="https://blog.example.com/og-image/blog/hello.png""#));
        assert!(page.contains(r#"<time datetime="2024-06-15T00:00:00Z">2024.06.15</time>"#));
        assert!(page.contains("github-card"));
        assert!(page.contains("twitter-card"));
        assert!(page.contains(r#"<li>rust</li>"#));

        let tool = fs::read_to_string(out.join("projects/tool/index.html")).unwrap();
        assert!(tool.contains(r#"content="https://blog.example.com/custom.png""#));

        assert!(!out.join("blog/draft/index.html").exists());
        assert!(out.join("styles/embeds.css").is_file());
        assert_eq!(fs::read_to_string(out.join("favicon.ico")).unwrap(), "icon");

        let feed = fs::read_to_string(out.join("rss.xml")).unwrap();
        assert!(feed.contains("https://blog.example.com/blog/hello/"));
        assert!(!feed.contains("Draft"));

        // Unchanged second build rewrites nothing
        let again = build_site(&config).unwrap();
        assert_eq!(again.written, 0);
        assert_eq!(again.public_files, 0);
    }

    #[test]
    fn test_clean_removes_stale_output() {
        let dir = TempDir::new().unwrap();
        let mut config = site(&dir);
        let stale = dir.path().join("dist/old/index.html");
        write(&stale, "old");

        build_site(&config).unwrap();
        assert!(stale.exists());

        config.build.clean = true;
        build_site(&config).unwrap();
        assert!(!stale.exists());
    }
}
