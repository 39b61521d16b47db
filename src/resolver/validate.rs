//! Candidate validation
//!
//! A directory is a virtual environment iff it carries every configured
//! marker file and marker subdirectory. Existence checks only: nothing is
//! read or parsed, and a probe error counts as absence.

use std::path::Path;

use crate::resolver::config::ResolverConfig;
use crate::resolver::fs::FileSystem;

/// Check whether `path` is a valid virtual environment under `config`.
///
/// Pure function of filesystem state at call time. Results are not cached
/// here; memoization belongs to the search controller.
pub fn is_valid_env<F: FileSystem>(fs: &F, config: &ResolverConfig, path: &Path) -> bool {
    if !fs.is_dir(path) {
        return false;
    }

    config
        .required_files
        .iter()
        .all(|name| fs.is_file(&path.join(name)))
        && config
            .required_dirs
            .iter()
            .all(|name| fs.is_dir(&path.join(name)))
}
