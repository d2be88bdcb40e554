//! Log query error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading the capture log root
#[derive(Error, Debug)]
pub enum LogQueryError {
    /// Empty session id
    #[error("Missing session ID")]
    MissingId,

    /// Session id resolves outside the log root
    #[error("Session id escapes the log root: {0}")]
    OutsideRoot(String),

    /// Session directory (or its pointer) does not exist
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Unexpected filesystem failure
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored JSON could not be parsed
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LogQueryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
