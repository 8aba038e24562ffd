//! `[site]` configuration.
//!
//! Site identity used in page heads, the feed channel and the OG footer.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Site title.
    pub title: String,

    /// Site description.
    pub description: String,

    /// Absolute site URL (e.g. "https://blog.example.com"). Required for the feed.
    pub url: Option<String>,

    /// Language code for `<html lang>` and the feed.
    pub language: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Blog".into(),
            description: String::new(),
            url: None,
            language: "ja".into(),
        }
    }
}

pub struct SiteFields {
    pub title: FieldPath,
    pub url: FieldPath,
    pub language: FieldPath,
}

impl SiteSection {
    pub const FIELDS: SiteFields = SiteFields {
        title: FieldPath::new("site.title"),
        url: FieldPath::new("site.url"),
        language: FieldPath::new("site.language"),
    };

    /// Site URL without a trailing slash, or empty when unset.
    pub fn base_url(&self) -> &str {
        self.url.as_deref().map_or("", |url| url.trim_end_matches('/'))
    }

    /// # Checks
    /// - `title` must not be empty
    /// - if `feed_enabled`, `url` must be set
    /// - `url` must be an http(s) URL with a host
    pub fn validate(&self, feed_enabled: bool, diag: &mut ConfigDiagnostics) {
        if self.title.trim().is_empty() {
            diag.error(Self::FIELDS.title, "site title must not be empty");
        }

        if self.language.trim().is_empty() {
            diag.error_with_hint(
                Self::FIELDS.language,
                "language must not be empty",
                "use a code like \"ja\" or \"en\"",
            );
        }

        if feed_enabled && self.url.is_none() {
            diag.error_with_hint(
                Self::FIELDS.url,
                format!("the feed is enabled but {} is not configured", Self::FIELDS.url),
                format!("set {}, e.g.: \"https://example.com\"", Self::FIELDS.url),
            );
        }

        if let Some(url_str) = &self.url {
            match url::Url::parse(url_str) {
                Ok(parsed) => {
                    if !matches!(parsed.scheme(), "http" | "https") {
                        diag.error_with_hint(
                            Self::FIELDS.url,
                            format!(
                                "scheme '{}' not supported, must be http or https",
                                parsed.scheme()
                            ),
                            "use format like https://example.com",
                        );
                    }
                    if parsed.host_str().is_none() {
                        diag.error_with_hint(
                            Self::FIELDS.url,
                            "URL must have a valid host",
                            "use format like https://example.com",
                        );
                    }
                }
                Err(e) => {
                    diag.error_with_hint(
                        Self::FIELDS.url,
                        format!("invalid URL: {e}"),
                        "use format like https://example.com",
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let site = SiteSection::default();
        assert_eq!(site.title, "Blog");
        assert_eq!(site.language, "ja");
        assert!(site.url.is_none());
    }

    #[test]
    fn test_base_url_trims_slash() {
        let config = test_parse_config("[site]\nurl = \"https://blog.example.com/\"");
        assert_eq!(config.site.base_url(), "https://blog.example.com");
    }

    #[test]
    fn test_feed_requires_url() {
        let mut diag = ConfigDiagnostics::new();
        SiteSection::default().validate(true, &mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field, SiteSection::FIELDS.url);

        let mut diag = ConfigDiagnostics::new();
        SiteSection::default().validate(false, &mut diag);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let site = SiteSection {
            url: Some("ftp://example.com".into()),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        site.validate(true, &mut diag);
        assert!(diag.errors()[0].message.contains("ftp"));

        let site = SiteSection {
            url: Some("not a url".into()),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        site.validate(false, &mut diag);
        assert!(diag.has_errors());
    }
}
