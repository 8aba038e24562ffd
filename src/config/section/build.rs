//! `[build]` configuration.
//!
//! Paths are relative to the project root in the file and made absolute
//! once the config is loaded.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use super::{FeedConfig, OgConfig};
use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Content root; each collection is a sub-directory.
    pub content: PathBuf,
    /// Collection names. The first one receives new posts.
    pub collections: Vec<String>,
    /// Output directory.
    pub output: PathBuf,
    /// Static files copied verbatim into the output.
    pub public: PathBuf,
    /// Build cache directory.
    pub cache: PathBuf,
    /// Include draft posts.
    pub drafts: bool,

    /// Remove the output directory before building (`--clean`).
    #[serde(skip)]
    pub clean: bool,

    pub feed: FeedConfig,
    pub og: OgConfig,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            content: "src/content".into(),
            collections: vec!["blog".into(), "projects".into()],
            output: "dist".into(),
            public: "public".into(),
            cache: ".cache".into(),
            drafts: false,
            clean: false,
            feed: FeedConfig::default(),
            og: OgConfig::default(),
        }
    }
}

pub struct BuildFields {
    pub collections: FieldPath,
    pub output: FieldPath,
}

impl BuildSection {
    pub const FIELDS: BuildFields = BuildFields {
        collections: FieldPath::new("build.collections"),
        output: FieldPath::new("build.output"),
    };

    /// Make every configured path absolute against `root`.
    pub fn normalize_paths(&mut self, root: &Path) {
        for path in [
            &mut self.content,
            &mut self.output,
            &mut self.public,
            &mut self.cache,
        ] {
            *path = root.join(&*path);
        }
        for dir in &mut self.og.fonts {
            *dir = root.join(&*dir);
        }
    }

    pub fn validate(&self, root: &Path, diag: &mut ConfigDiagnostics) {
        if self.collections.is_empty() {
            diag.error(Self::FIELDS.collections, "at least one collection is required");
        }
        for name in &self.collections {
            if !is_simple_segment(name) {
                diag.error_with_hint(
                    Self::FIELDS.collections,
                    format!("`{name}` is not a plain directory name"),
                    "use names like \"blog\" or \"projects\"",
                );
            }
        }

        if self.output == root {
            diag.error_with_hint(
                Self::FIELDS.output,
                "output directory must not be the project root",
                "e.g. output = \"dist\"",
            );
        }

        self.feed.validate(diag);
        self.og.validate(diag);
    }
}

/// One normal path component: no separators, no `.`/`..`.
fn is_simple_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
