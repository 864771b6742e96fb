//! Directory error taxonomy
//!
//! Only outcomes a caller has to branch on live here. A missing override
//! is not an error at all, and malformed overrides never escape the cache.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which kind of entity a key addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Project,
    Founder,
}

impl EntityKind {
    /// Content subdirectory holding overrides for this kind
    pub fn dir_name(&self) -> &'static str {
        match self {
            EntityKind::Project => "projects",
            EntityKind::Founder => "founders",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => write!(f, "project"),
            EntityKind::Founder => write!(f, "founder"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: EntityKind, key: String },
    #[error("Malformed override {path:?}: {reason}")]
    MalformedOverride { path: PathBuf, reason: String },
    #[error("Invalid dataset: {0}")]
    Dataset(#[from] serde_json::Error),
    #[error("Invalid dataset record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl DirectoryError {
    pub fn not_found(kind: EntityKind, key: impl Into<String>) -> Self {
        DirectoryError::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// True when the page layer should answer with a not-found response
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::NotFound { .. })
    }
}

pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;
