//! Social preview (OG) images.
//!
//! Every built entry without an `ogImage` gets a generated PNG at
//! `<public>/<og dir>/<collection>/<id>.png`. A hash of the card inputs is
//! kept in `<cache>/og-image.json`; an image is only re-rendered when its
//! file is missing or its hash changed.
//!
//! ```text
//! load cache ─► plan (hash every entry) ─► load fonts ─► render stale cards
//!                                                        (rayon, resvg)
//!                                           save cache ◄─┘
//! ```
//!
//! A stale card's hash only reaches the cache once its PNG is on disk, so a
//! failed build leaves it stale for the next one.

mod cache;
mod font;
mod layout;
mod raster;

pub use cache::OgCache;
pub use font::OgFonts;
pub use layout::{Families, Footer, OgCard, render_svg};

use crate::config::SiteConfig;
use crate::content::Entry;
use crate::freshness::ContentHash;
use crate::logger::ProgressLine;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OgError {
    #[error("OG image font not found (searched: {dirs}); add .ttf/.otf/.ttc files or set [build.og] fonts")]
    NoFonts { dirs: String },

    #[error("failed to parse card SVG: {0}")]
    Svg(String),

    #[error("failed to allocate the card canvas")]
    Raster,

    #[error("failed to encode PNG")]
    Encode(#[from] image::ImageError),
}

/// Hash of the inputs that show on a card.
///
/// Key order of the JSON payload is fixed, so equal inputs always hash the
/// same.
pub fn card_hash(entry: &Entry) -> ContentHash {
    let payload = json!({
        "title": entry.title,
        "description": entry.description,
        "date": entry.date.to_iso_millis(),
    });
    ContentHash::of(payload.to_string().as_bytes())
}

/// A card to render.
#[derive(Debug, Clone, PartialEq)]
pub struct OgJob {
    pub key: String,
    pub hash: ContentHash,
    pub output: PathBuf,
    pub card: OgCard,
}

/// Hash every entry that needs a generated image.
///
/// Returns the jobs to render. The cache itself is not touched: a job's
/// hash is recorded by the caller once its image is written.
pub fn plan(config: &SiteConfig, entries: &[Entry], cache: &OgCache) -> Vec<OgJob> {
    let dir = config.og_image_dir();
    let mut jobs = Vec::new();

    for entry in entries.iter().filter(|e| e.og_image.is_none()) {
        let key = entry.key();
        let hash = card_hash(entry);

        let output = dir.join(format!("{key}.png"));
        if output.exists() && cache.get(&key) == Some(hash) {
            continue;
        }
        crate::debug!("og"; "{key} needs render ({hash})");
        jobs.push(OgJob {
            key,
            hash,
            output,
            card: OgCard {
                title: entry.title.clone(),
                description: entry.description.clone(),
                date: entry.date.to_dotted(),
            },
        });
    }

    jobs
}

/// Site-relative URL of an entry's social image.
///
/// An author-supplied `ogImage` wins over the generated one.
pub fn image_url(config: &SiteConfig, entry: &Entry) -> String {
    match &entry.og_image {
        Some(url) => url.clone(),
        None => format!("{}/{}.png", config.og_image_url_prefix(), entry.key()),
    }
}

/// Generate stale images. Returns how many were rendered.
///
/// Every job is attempted; the cache is saved with the hashes of the images
/// that were written, then the first failure (if any) is returned.
pub fn build_og_images(config: &SiteConfig, entries: &[Entry]) -> Result<usize> {
    if !config.build.og.enable {
        return Ok(0);
    }

    let cache_path = config.og_cache_path();
    let mut cache = OgCache::load(&cache_path);
    let jobs = plan(config, entries, &cache);
    if jobs.is_empty() {
        crate::debug!("og"; "all images up to date");
        return Ok(0);
    }

    let fonts = OgFonts::load(&config.build.og)?;
    let options = fonts.usvg_options();
    let footer = Footer {
        title: config.site.title.clone(),
        description: config.site.description.clone(),
    };

    let progress = ProgressLine::new("og", &[("images", jobs.len())]);
    let results: Vec<Result<()>> = jobs
        .par_iter()
        .map(|job| {
            let result = render_job(job, &footer, &fonts.families, &options);
            progress.inc("images");
            result
        })
        .collect();
    progress.finish();

    let (rendered, failure) = record_rendered(&mut cache, &jobs, results);
    cache
        .save(&cache_path)
        .with_context(|| format!("failed to write {}", cache_path.display()))?;

    match failure {
        Some(err) => Err(err),
        None => Ok(rendered),
    }
}

fn render_job(
    job: &OgJob,
    footer: &Footer,
    families: &Families,
    options: &usvg::Options,
) -> Result<()> {
    let svg = render_svg(&job.card, footer, families);
    let png = raster::render_png(&svg, options)
        .with_context(|| format!("failed to render OG image for {}", job.key))?;

    if let Some(parent) = job.output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&job.output, png)
        .with_context(|| format!("failed to write {}", job.output.display()))?;
    Ok(())
}

/// Record the hash of every written image. Returns the count and the first error.
fn record_rendered(
    cache: &mut OgCache,
    jobs: &[OgJob],
    results: Vec<Result<()>>,
) -> (usize, Option<anyhow::Error>) {
    let mut rendered = 0;
    let mut failure = None;

    for (job, result) in jobs.iter().zip(results) {
        match result {
            Ok(()) => {
                cache.insert(job.key.clone(), job.hash);
                rendered += 1;
            }
            Err(err) if failure.is_none() => failure = Some(err),
            Err(err) => crate::log!("error"; "{err:#}"),
        }
    }

    (rendered, failure)
}
