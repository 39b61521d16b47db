//! Unified Result Model
//!
//! Every subcommand (resolve, check, scan) maps its outcome to this model
//! before rendering output.

use serde::{Deserialize, Serialize};

/// The kind of result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// A validated virtual environment
    Env,
    /// A directory was searched and no environment was found
    Miss,
    /// A malformed invocation (not an ordinary "nothing found")
    Error,
}

/// How an environment was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Matched a configured common name (pass 1)
    Name,
    /// Matched by marker files/dirs alone (pass 2)
    Structure,
    /// Found by a full tree scan
    Scan,
    /// Served from the resolver cache
    Cache,
}

/// Metadata for a result item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Ancestor levels climbed before the environment was found (0 = start dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,

    /// Whether the found path is the shell's currently active environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Path of the environment's activation script
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activate: Option<String>,
}

/// Error information for a result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindError {
    pub code: String,
    pub message: String,
}

impl FindError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The unified result item that all subcommands produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    /// The kind of this result
    pub kind: Kind,

    /// The directory the query started from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// The resolved virtual environment directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// How the environment was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,

    /// Metadata
    #[serde(default)]
    pub meta: Meta,

    /// Errors (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FindError>,
}

impl ResultItem {
    /// Create a new found-environment result
    pub fn env(start: impl Into<String>, path: impl Into<String>, origin: Origin) -> Self {
        Self {
            kind: Kind::Env,
            start: Some(start.into()),
            path: Some(path.into()),
            origin: Some(origin),
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a new searched-and-not-found result
    pub fn miss(start: impl Into<String>) -> Self {
        Self {
            kind: Kind::Miss,
            start: Some(start.into()),
            path: None,
            origin: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a new error result
    pub fn error(error: FindError) -> Self {
        Self {
            kind: Kind::Error,
            start: None,
            path: None,
            origin: None,
            meta: Meta::default(),
            errors: vec![error],
        }
    }

    /// Set metadata
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Set the start directory on an error result
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }
}

/// Result set containing multiple result items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    /// Sort items by path, then start, for stable output
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| {
            let path_cmp = a.path.cmp(&b.path);
            if path_cmp != std::cmp::Ordering::Equal {
                return path_cmp;
            }
            a.start.cmp(&b.start)
        });
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for ResultSet {
    type Item = ResultItem;
    type IntoIter = std::vec::IntoIter<ResultItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<ResultItem> for ResultSet {
    fn from_iter<T: IntoIterator<Item = ResultItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
