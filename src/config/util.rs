//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find the config file by searching upward from `start`.
///
/// ```text
/// /home/user/blog/src/content/blog/  ← start
/// /home/user/blog/kiroku.toml        ← found
/// ```
pub fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}
