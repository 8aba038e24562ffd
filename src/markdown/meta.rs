//! Post frontmatter: YAML (`---`) or TOML (`+++`) blocks at the top of a file.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

/// Frontmatter fields of a post.
///
/// `title` and `date` are required for a publishable post; they are kept
/// optional here so the loader can report which one is missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub draft: bool,
    /// Author-supplied social preview image; disables generation.
    #[serde(default)]
    pub og_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// `tags:` with no value parses as null; treat it like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Split a source file into frontmatter and body.
///
/// Returns `Ok(None)` when the file has no frontmatter block.
pub fn extract_frontmatter(content: &str) -> Result<Option<(PostMeta, &str)>> {
    let Some((fm, body, is_toml)) = detect_frontmatter(content) else {
        return Ok(None);
    };

    let meta = if is_toml {
        parse_toml(fm)?
    } else {
        parse_yaml(fm)?
    };
    Ok(Some((meta, body)))
}

fn parse_yaml(fm: &str) -> Result<PostMeta> {
    if fm.trim().is_empty() {
        return Ok(PostMeta::default());
    }
    serde_yaml::from_str(fm).context("invalid YAML frontmatter")
}

fn parse_toml(fm: &str) -> Result<PostMeta> {
    let mut table: toml::Table = toml::from_str(fm).context("invalid TOML frontmatter")?;

    // `date = 2024-01-01` is a TOML datetime, not a string
    if let Some(toml::Value::Datetime(dt)) = table.get("date") {
        let text = dt.to_string();
        table.insert("date".into(), toml::Value::String(text));
    }

    toml::Value::Table(table)
        .try_into()
        .context("invalid TOML frontmatter")
}

/// Find `(frontmatter, body, is_toml)`.
///
/// The fence must be the first line and the closing fence must sit on a
/// line of its own.
fn detect_frontmatter(content: &str) -> Option<(&str, &str, bool)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    for (fence, is_toml) in [("---", false), ("+++", true)] {
        let Some(rest) = content.strip_prefix(fence) else {
            continue;
        };
        let Some(rest) = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
        else {
            continue;
        };

        let mut offset = 0;
        for line in rest.split_inclusive('\n') {
            if line.trim_end() == fence {
                let fm = &rest[..offset];
                let body = &rest[offset + line.len()..];
                return Some((fm, body, is_toml));
            }
            offset += line.len();
        }
    }

    None
}
