//! Content error types
//!
//! A missing document and a document that fails to render are different
//! conditions: the first belongs to routing (404), the second is a server
//! fault (500). Every content operation reports through this enum so the
//! two are never conflated.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by catalog loading and document rendering
#[derive(Error, Debug)]
pub enum ContentError {
    /// No document matches the requested slug. Also covers a file that
    /// disappeared between catalog load and the render read.
    #[error("no post matches slug '{slug}'")]
    PostNotFound { slug: String },

    #[error("content directory {path:?} is not readable")]
    ContentDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid front-matter in {path:?}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ContentError {
    /// Whether this error should surface as a routing-level 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::PostNotFound { .. })
    }
}
