//! Hash cache for generated OG images (`.cache/og-image.json`).
//!
//! Maps `<collection>/<id>` to the hex hash of the card's inputs. Keys of
//! removed posts are kept, so the file only ever grows.

use crate::freshness::ContentHash;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OgCache {
    entries: BTreeMap<String, String>,
}

impl OgCache {
    /// Read the cache. A missing or unparsable file is an empty cache.
    pub fn load(path: &Path) -> Self {
        let entries = fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self { entries }
    }

    /// Write via a temp file and rename, so readers never see a partial file.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(io::Error::other)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)
    }

    pub fn get(&self, key: &str) -> Option<ContentHash> {
        self.entries.get(key).and_then(|hex| ContentHash::from_hex(hex))
    }

    pub fn insert(&mut self, key: String, hash: ContentHash) {
        self.entries.insert(key, hash.to_hex());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".cache/og-image.json");

        let mut cache = OgCache::default();
        cache.insert("blog/a".into(), ContentHash::of(b"a"));
        cache.save(&path).unwrap();

        let loaded = OgCache::load(&path);
        assert_eq!(loaded, cache);
        assert_eq!(loaded.get("blog/a"), Some(ContentHash::of(b"a")));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_missing_or_corrupt_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("og-image.json");
        assert!(OgCache::load(&path).is_empty());

        fs::write(&path, "{not json").unwrap();
        assert!(OgCache::load(&path).is_empty());

        fs::write(&path, r#"{"blog/a": "zz"}"#).unwrap();
        let cache = OgCache::load(&path);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("blog/a"), None);
    }
}
