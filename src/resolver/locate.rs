//! Single-directory location
//!
//! Two passes over one directory: first the configured common names in
//! priority order, then the remaining non-hidden subdirectories by
//! structure. Hidden directories are only ever matched by explicit name in
//! pass 1; pass 2 skips them so tooling directories like `.git` or
//! `.mypy_cache` cannot produce false positives.

use std::path::{Path, PathBuf};

use crate::core::paths::is_hidden;
use crate::resolver::config::ResolverConfig;
use crate::resolver::fs::FileSystem;
use crate::resolver::validate::is_valid_env;

/// Which pass matched a located environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Matched a configured common name
    Name,
    /// Matched by marker structure alone
    Structure,
}

/// A validated environment found within one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub path: PathBuf,
    pub pass: Pass,
}

/// Find a virtual environment directly under `base`.
///
/// Pass 2 visits entries in lexicographic filename order, so the result is
/// deterministic even when several siblings validate.
pub fn locate_in_directory<F: FileSystem>(
    fs: &F,
    config: &ResolverConfig,
    base: &Path,
) -> Option<Located> {
    if !fs.is_dir(base) {
        return None;
    }

    // Pass 1: conventional names, in configured priority order
    for name in &config.common_names {
        let candidate = base.join(name);
        if is_valid_env(fs, config, &candidate) {
            return Some(Located {
                path: candidate,
                pass: Pass::Name,
            });
        }
    }

    // Pass 2: any non-hidden subdirectory with the right structure
    let mut entries = fs.list_dir(base).unwrap_or_default();
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    for entry in entries {
        if is_hidden(&entry) {
            continue;
        }
        if is_valid_env(fs, config, &entry) {
            return Some(Located {
                path: entry,
                pass: Pass::Structure,
            });
        }
    }

    None
}
