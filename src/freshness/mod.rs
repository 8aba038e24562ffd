//! Freshness detection: blake3 content hashes, used to leave unchanged
//! outputs untouched (so file mtimes stay put across builds) and to key the
//! OG image cache.

mod hash;

pub use hash::{ContentHash, compute_file_hash};

use std::fs;
use std::io;
use std::path::Path;

/// Write `content` to `path` unless the file already holds exactly that.
///
/// Returns whether the file was written. Parent directories are created.
pub fn write_if_changed(path: &Path, content: &[u8]) -> io::Result<bool> {
    if compute_file_hash(path) == Some(ContentHash::of(content)) {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(true)
}

/// Copy `src` to `dst` unless `dst` already has the same contents.
pub fn copy_if_changed(src: &Path, dst: &Path) -> io::Result<bool> {
    let src_hash = compute_file_hash(src);
    if src_hash.is_some() && src_hash == compute_file_hash(dst) {
        return Ok(false);
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst)?;
    Ok(true)
}
