//! Shared helpers reused across modules (e.g., path resolution).

use std::path::{Path, PathBuf};

/// Returns true if the path is non-empty and absolute.
pub fn is_nonempty_absolute(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.is_absolute()
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if is_nonempty_absolute(path) {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
