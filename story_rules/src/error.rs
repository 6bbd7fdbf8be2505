//! Errors raised while loading story definitions and engine configuration.
//!
//! Evaluating a loaded story never fails; malformed references simply stop
//! narrative progress. Only the loaders below can return an error.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced when reading a story definition or configuration.
#[derive(Debug, Error)]
pub enum StoryError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON for the expected shape.
    #[error("Invalid JSON story data: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is not valid TOML for the expected shape.
    #[error("Invalid TOML story data: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file extension does not name a supported format.
    #[error("Unsupported story format: {0}")]
    UnsupportedFormat(PathBuf),
}

impl StoryError {
    /// Create an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for story loading operations.
pub type StoryResult<T> = Result<T, StoryError>;
