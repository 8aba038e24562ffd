//! `[build.og]` configuration.
//!
//! ```toml
//! [build.og]
//! enable = true
//! dir = "og-image"                  # under [build] public
//! fonts = ["fonts"]                 # searched for .ttf/.otf/.ttc
//! sans = ["Noto Sans JP", "Geist"]  # first installed family wins
//! mono = ["Geist Mono"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OgConfig {
    /// Generate images for posts without `ogImage`.
    pub enable: bool,
    /// Directory under the public directory that receives the PNGs.
    pub dir: PathBuf,
    /// Font directories (relative to the project root).
    pub fonts: Vec<PathBuf>,
    /// Preferred families for title and description, in order.
    pub sans: Vec<String>,
    /// Preferred families for the date line, in order.
    pub mono: Vec<String>,
}

impl Default for OgConfig {
    fn default() -> Self {
        Self {
            enable: true,
            dir: "og-image".into(),
            fonts: vec!["fonts".into()],
            sans: vec!["Noto Sans JP".into(), "Geist".into()],
            mono: vec!["Geist Mono".into()],
        }
    }
}

pub struct OgFields {
    pub dir: FieldPath,
    pub fonts: FieldPath,
    pub sans: FieldPath,
}

impl OgConfig {
    pub const FIELDS: OgFields = OgFields {
        dir: FieldPath::new("build.og.dir"),
        fonts: FieldPath::new("build.og.fonts"),
        sans: FieldPath::new("build.og.sans"),
    };

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.enable {
            return;
        }
        if self.dir.as_os_str().is_empty() || self.dir.is_absolute() {
            diag.error_with_hint(
                Self::FIELDS.dir,
                "OG image directory must be relative to the public directory",
                "e.g. \"og-image\"",
            );
        }
        if self.fonts.is_empty() {
            diag.error_with_hint(
                Self::FIELDS.fonts,
                "at least one font directory is required",
                "e.g. fonts = [\"fonts\"]",
            );
        }
        if self.sans.is_empty() {
            diag.error(Self::FIELDS.sans, "at least one sans family is required");
        }
    }
}
