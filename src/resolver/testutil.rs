//! Shared test fixtures for the resolver modules

use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Lay down a default-shaped environment (`pyvenv.cfg`, `bin/`, `lib/`)
/// under `parent/name` and return its path.
pub(crate) fn make_env(parent: &Path, name: &str) -> PathBuf {
    let env = parent.join(name);
    fs::create_dir_all(env.join("bin")).unwrap();
    fs::create_dir_all(env.join("lib")).unwrap();
    File::create(env.join("pyvenv.cfg")).unwrap();
    env
}
