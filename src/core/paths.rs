//! Path utilities
//!
//! Cache keys must be stable for a given directory, so queries are
//! canonicalized before any lookup.

use std::path::{Path, PathBuf};

/// Canonicalize a path, falling back to the path as given when the
/// filesystem cannot resolve it (nonexistent path, permission error).
pub fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Check if a path is hidden (file name starts with '.')
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Display a path with '/' as separator (for cross-platform output consistency)
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
