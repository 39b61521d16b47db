//! Resolver configuration
//!
//! The recognized-option set: candidate directory names, marker files and
//! directories, parent-search bounds. A configuration is validated when it
//! is handed to a resolver, never during resolution, and its canonical JSON
//! form is fingerprinted so the resolver can tell when a replacement config
//! actually changed.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

use crate::resolver::log::LogLevel;

/// Conventional directory names checked in priority order
pub static DEFAULT_COMMON_NAMES: Lazy<Vec<String>> = Lazy::new(|| {
    ["env", "venv", ".env", ".venv", "virtualenv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
});

/// Marker files a candidate must contain
pub static DEFAULT_REQUIRED_FILES: Lazy<Vec<String>> =
    Lazy::new(|| vec!["pyvenv.cfg".to_string()]);

/// Marker subdirectories a candidate must contain
pub static DEFAULT_REQUIRED_DIRS: Lazy<Vec<String>> =
    Lazy::new(|| vec!["bin".to_string(), "lib".to_string()]);

/// Ancestor levels climbed when parent search is enabled
pub const DEFAULT_MAX_PARENT_DEPTH: usize = 5;

/// Configuration errors, surfaced at configuration-set time
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} contains an empty name")]
    EmptyName { field: &'static str },

    #[error("{field} entry {value:?} is not a single path component")]
    NotAComponent { field: &'static str, value: String },
}

/// The recognized options of a resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Candidate directory names, in priority order
    pub common_names: Vec<String>,

    /// Files that must exist directly under a candidate (a set)
    pub required_files: Vec<String>,

    /// Subdirectories that must exist directly under a candidate (a set)
    pub required_dirs: Vec<String>,

    /// Walk ancestor directories when the start directory has no environment
    pub search_parents: bool,

    /// Upper bound on ancestor levels visited
    pub max_parent_depth: usize,

    /// Decorate found environments with their activation script path
    pub auto_activate: bool,

    /// Diagnostic verbosity
    pub log_level: LogLevel,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            common_names: DEFAULT_COMMON_NAMES.clone(),
            required_files: DEFAULT_REQUIRED_FILES.clone(),
            required_dirs: DEFAULT_REQUIRED_DIRS.clone(),
            search_parents: true,
            max_parent_depth: DEFAULT_MAX_PARENT_DEPTH,
            auto_activate: false,
            log_level: LogLevel::Silent,
        }
    }
}

impl ResolverConfig {
    /// Check that every configured name is usable as a direct child name.
    ///
    /// Names must be non-empty single path components: an entry like
    /// `"a/b"` or `".."` would silently probe outside the candidate
    /// directory, so it is rejected here rather than misbehaving later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_names("common_names", &self.common_names)?;
        validate_names("required_files", &self.required_files)?;
        validate_names("required_dirs", &self.required_dirs)?;
        Ok(())
    }

    /// Fingerprint of the canonical JSON form, for change detection
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        format!("{:016x}", xxh3_64(&json))
    }
}

fn validate_names(field: &'static str, names: &[String]) -> Result<(), ConfigError> {
    for name in names {
        if name.is_empty() {
            return Err(ConfigError::EmptyName { field });
        }
        let mut components = std::path::Path::new(name).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(std::path::Component::Normal(_)), None)
        );
        if !single_normal {
            return Err(ConfigError::NotAComponent {
                field,
                value: name.clone(),
            });
        }
    }
    Ok(())
}
