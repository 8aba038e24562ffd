//! `[build.feed]` configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Enable RSS generation.
    pub enable: bool,
    /// Output path, relative to the output directory.
    pub path: PathBuf,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enable: true,
            path: "rss.xml".into(),
        }
    }
}

pub struct FeedFields {
    pub enable: FieldPath,
    pub path: FieldPath,
}

impl FeedConfig {
    pub const FIELDS: FeedFields = FeedFields {
        enable: FieldPath::new("build.feed.enable"),
        path: FieldPath::new("build.feed.path"),
    };

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.enable {
            return;
        }
        if self.path.as_os_str().is_empty() || self.path.is_absolute() {
            diag.error_with_hint(
                Self::FIELDS.path,
                "feed path must be a relative file path",
                "e.g. \"rss.xml\"",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert!(config.build.feed.enable);
        assert_eq!(config.build.feed.path, PathBuf::from("rss.xml"));
    }

    #[test]
    fn test_custom_config() {
        let config = test_parse_config("[build.feed]\nenable = false\npath = \"feed.xml\"");
        assert!(!config.build.feed.enable);
        assert_eq!(config.build.feed.path, PathBuf::from("feed.xml"));
    }

    #[test]
    fn test_rejects_empty_path() {
        let feed = FeedConfig {
            enable: true,
            path: PathBuf::new(),
        };
        let mut diag = ConfigDiagnostics::new();
        feed.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
