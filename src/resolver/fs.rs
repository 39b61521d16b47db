//! Filesystem seam
//!
//! The resolver only ever asks three questions of the filesystem: is this a
//! regular file, is this a directory, what are the immediate entries of a
//! directory. Everything goes through this trait so tests can substitute a
//! counting or faked filesystem.

use std::io;
use std::path::{Path, PathBuf};

/// The filesystem queries the resolver needs.
///
/// Probe errors (permission denied, transient I/O) read as absence: the
/// boolean checks return false and `list_dir` surfaces the error for the
/// caller to fold into an empty listing. A failed probe never aborts a
/// search.
pub trait FileSystem {
    /// Does `path` name an existing regular file?
    fn is_file(&self, path: &Path) -> bool;

    /// Does `path` name an existing directory?
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate entries of `path`, as full paths. Order is unspecified.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            entries.push(entry.path());
        }
        Ok(entries)
    }
}
