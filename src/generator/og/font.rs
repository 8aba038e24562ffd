//! Font discovery for OG cards.

use super::OgError;
use super::layout::Families;
use crate::config::OgConfig;
use jwalk::WalkDir;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use usvg::fontdb;

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

/// Fonts loaded from the configured directories, with resolved families.
pub struct OgFonts {
    db: Arc<fontdb::Database>,
    pub families: Families,
}

impl OgFonts {
    /// Load every font under `[build.og] fonts`.
    ///
    /// Fails when no font could be loaded at all.
    pub fn load(og: &OgConfig) -> Result<Self, OgError> {
        let mut db = fontdb::Database::new();
        for dir in &og.fonts {
            for path in font_files(dir) {
                match fs::read(&path) {
                    Ok(data) => db.load_font_data(data),
                    Err(err) => crate::log!("warn"; "skipping font {}: {err}", path.display()),
                }
            }
        }

        let available = family_names(&db);
        let Some(sans) = pick_family(&available, &og.sans).or_else(|| available.first().cloned())
        else {
            let dirs = og
                .fonts
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(OgError::NoFonts { dirs });
        };
        let mono = pick_family(&available, &og.mono).unwrap_or_else(|| sans.clone());

        crate::debug!("og"; "fonts: {} faces, sans `{}`, mono `{}`", db.len(), sans, mono);
        db.set_sans_serif_family(sans.clone());
        db.set_monospace_family(mono.clone());

        Ok(Self {
            db: Arc::new(db),
            families: Families { sans, mono },
        })
    }

    /// Parser options sharing the loaded font database.
    pub fn usvg_options(&self) -> usvg::Options<'static> {
        usvg::Options {
            font_family: self.families.sans.clone(),
            fontdb: Arc::clone(&self.db),
            ..Default::default()
        }
    }
}

fn font_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    files.sort();
    files
}

/// Family names in load order, without duplicates.
fn family_names(db: &fontdb::Database) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for face in db.faces() {
        if let Some((name, _)) = face.families.first()
            && !names.contains(name)
        {
            names.push(name.clone());
        }
    }
    names
}

/// First preferred family that is available, matched case-insensitively.
fn pick_family(available: &[String], preferred: &[String]) -> Option<String> {
    preferred.iter().find_map(|want| {
        available
            .iter()
            .find(|name| name.eq_ignore_ascii_case(want))
            .cloned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_pick_family_follows_preference() {
        let available = names(&["Geist", "Noto Sans JP", "Geist Mono"]);
        assert_eq!(
            pick_family(&available, &names(&["noto sans jp", "Geist"])),
            Some("Noto Sans JP".into())
        );
        assert_eq!(
            pick_family(&available, &names(&["Inter", "Geist"])),
            Some("Geist".into())
        );
        assert_eq!(pick_family(&available, &names(&["Inter"])), None);
    }

    #[test]
    fn test_font_files_filter() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("noto")).unwrap();
        fs::write(dir.path().join("noto/a.TTF"), b"").unwrap();
        fs::write(dir.path().join("b.otf"), b"").unwrap();
        fs::write(dir.path().join("c.woff"), b"").unwrap();

        let files = font_files(dir.path());
        assert_eq!(files, [dir.path().join("b.otf"), dir.path().join("noto/a.TTF")]);
        assert!(font_files(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn test_no_fonts_is_an_error() {
        let dir = TempDir::new().unwrap();
        let og = OgConfig {
            fonts: vec![dir.path().to_path_buf(), PathBuf::from("/nonexistent/fonts")],
            ..OgConfig::default()
        };
        let err = OgFonts::load(&og).err().unwrap();
        assert!(matches!(err, OgError::NoFonts { .. }));
        assert!(err.to_string().contains("font not found"));
    }
}
