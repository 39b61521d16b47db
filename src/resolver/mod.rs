//! Resolver module - locates Python virtual environments
//!
//! Composed of three operations that layer linearly:
//! - validate: is this directory a virtual environment?
//! - locate: two-pass search within one directory (names, then structure)
//! - search: drive the locator across a directory and its ancestors,
//!   memoizing one outcome per queried directory
//!
//! Plus the seams they hang off: configuration, the filesystem trait, the
//! leveled log sink, and a whole-tree scan.

pub mod config;
pub mod fs;
pub mod locate;
pub mod log;
pub mod scan;
pub mod search;
pub mod validate;

#[cfg(test)]
pub(crate) mod testutil;
