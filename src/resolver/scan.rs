//! Tree scan
//!
//! The "find them all" companion to the nearest-first resolver: walk a whole
//! directory tree and report every valid virtual environment in it.

use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::core::model::{Origin, ResultItem, ResultSet};
use crate::core::paths::{display_path, is_hidden};
use crate::resolver::config::ResolverConfig;
use crate::resolver::fs::OsFileSystem;
use crate::resolver::validate::is_valid_env;

/// Scan the tree under `root` and collect every valid environment.
///
/// Hidden directories follow the locator's rule unless `include_hidden` is
/// set: skipped, except those matching a configured common name. Gitignore
/// rules are not consulted, since environments are routinely gitignored.
/// The walk does not descend into a directory that validated.
pub fn scan_tree(
    config: &ResolverConfig,
    root: &Path,
    max_depth: Option<usize>,
    include_hidden: bool,
) -> Result<ResultSet> {
    config.validate()?;

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false);

    if let Some(depth) = max_depth {
        builder.max_depth(Some(depth));
    }

    if !include_hidden {
        let names = config.common_names.clone();
        builder.filter_entry(move |entry| {
            // The root is scanned even when its own name is hidden
            if entry.depth() == 0 || !is_hidden(entry.path()) {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .map(|name| names.iter().any(|n| n == name))
                .unwrap_or(false)
        });
    }

    let mut result_set = ResultSet::new();
    let mut found: Vec<PathBuf> = Vec::new();
    let root_display = display_path(root);

    for entry in builder.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        // Environments do not nest environments
        if found.iter().any(|env| path.starts_with(env)) {
            continue;
        }

        if is_valid_env(&OsFileSystem, config, path) {
            result_set.push(ResultItem::env(
                root_display.clone(),
                display_path(path),
                Origin::Scan,
            ));
            found.push(path.to_path_buf());
        }
    }

    result_set.sort();
    Ok(result_set)
}
