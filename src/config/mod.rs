//! Site configuration management for `kiroku.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [site], [build], [build.feed], [build.og]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config file discovery
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! The file is searched upward from the working directory; its parent is
//! the project root and every configured path is resolved against it.

pub mod section;
pub mod types;
mod util;

pub use section::{BuildSection, FeedConfig, OgConfig, SiteSection};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::cli::{BuildArgs, Cli};
use crate::log;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

/// OG hash cache file name inside `[build] cache`.
const OG_CACHE_FILE: &str = "og-image.json";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing kiroku.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory (parent of the config file)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub build: BuildSection,
}

impl SiteConfig {
    /// Find, parse and validate the config for `cli`, with CLI overrides applied.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let config_path = find_config_file(&cwd, &cli.config)
            .ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;

        let mut config = Self::from_path(&config_path)?;
        config.finalize(config_path);
        if let Some(args) = cli.build_args() {
            config.apply_build_args(args);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warn"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Record where the config lives and resolve paths against its directory.
    pub fn finalize(&mut self, config_path: PathBuf) {
        self.root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.config_path = config_path;
        let root = self.root.clone();
        self.build.normalize_paths(&root);
    }

    /// CLI flags win over the file.
    pub fn apply_build_args(&mut self, args: &BuildArgs) {
        if let Some(output) = &args.output {
            self.build.output = self.root.join(output);
        }
        self.build.clean = args.clean;
        self.build.drafts |= args.drafts;
        if let Some(rss) = args.rss {
            self.build.feed.enable = rss;
        }
        if let Some(og) = args.og {
            self.build.og.enable = og;
        }
    }

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.site.validate(self.build.feed.enable, &mut diag);
        self.build.validate(&self.root, &mut diag);
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    // ------------------------------------------------------------------------
    // paths
    // ------------------------------------------------------------------------

    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.build.content.join(collection)
    }

    /// Collection that receives scaffolded posts.
    pub fn default_collection(&self) -> &str {
        self.build
            .collections
            .first()
            .map_or("blog", String::as_str)
    }

    /// `<public>/<og dir>`, where generated images are written.
    pub fn og_image_dir(&self) -> PathBuf {
        self.build.public.join(&self.build.og.dir)
    }

    /// Site-relative URL prefix of generated images, e.g. `/og-image`.
    pub fn og_image_url_prefix(&self) -> String {
        let dir = self.build.og.dir.to_string_lossy().replace('\\', "/");
        format!("/{}", dir.trim_matches('/'))
    }

    pub fn og_cache_path(&self) -> PathBuf {
        self.build.cache.join(OG_CACHE_FILE)
    }

    pub fn feed_output(&self) -> PathBuf {
        self.build.output.join(&self.build.feed.path)
    }
}

/// Parse a test config with `[site]` defaults and no unknown keys.
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
