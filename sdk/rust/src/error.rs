//! Error types for the capture pipeline
//!
//! Only [`TransportError`] ever reaches a caller of a wrapped HTTP call. The
//! other two are produced and consumed inside the capture path.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of the underlying HTTP call
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Failure while reading a body stream.
///
/// Cloneable so a single upstream failure can be handed to both sides of a
/// duplicated body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Body stream error: {0}")]
pub struct BodyError(pub String);

impl From<reqwest::Error> for BodyError {
    fn from(e: reqwest::Error) -> Self {
        Self(e.to_string())
    }
}

/// Log store failure (always swallowed by the capture path)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
