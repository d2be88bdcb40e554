//! File-per-call log store
//!
//! Every write is best-effort: failures are logged and dropped so the capture
//! path never disturbs the call it observes.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::record::{
    CaptureRecord, HEARTBEAT_FILE_NAME, Heartbeat, LATEST_FILE_NAME, LatestPointer,
    iso_timestamp, record_file_name,
};
use crate::session;

/// Serialize `value` as pretty JSON to `path`, creating parent directories
pub async fn try_write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let json = serde_json::to_string_pretty(value)?;

    tokio::fs::write(path, json)
        .await
        .map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Best-effort [`try_write_json`]: logs failures and reports whether the write landed
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> bool {
    match try_write_json(path, value).await {
        Ok(()) => {
            tracing::trace!(path = %path.display(), "Wrote log file");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Failed to write log file");
            false
        }
    }
}

/// Session directories under a single log root
#[derive(Debug, Clone)]
pub struct LogStore {
    root: PathBuf,
}

impl LogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a session token, or today's date directory without one
    pub fn session_dir(&self, token: Option<&str>) -> PathBuf {
        session::resolve(&self.root, token)
    }

    /// Create the log root if missing
    pub async fn ensure_root(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StoreError::CreateDir {
                path: self.root.clone(),
                source,
            })
    }

    /// Persist one record and repoint the session's `latest.json` at it.
    ///
    /// The pointer is rewritten even when the record write failed. Returns the
    /// record path.
    pub async fn write_capture(
        &self,
        session_dir: &Path,
        seq: u64,
        record: &CaptureRecord,
        at: DateTime<Utc>,
    ) -> PathBuf {
        let file_name = record_file_name(seq, record.response.status, at);
        let path = session_dir.join(&file_name);

        write_json(&path, record).await;

        let pointer = LatestPointer::for_record(file_name, record);
        write_json(&session_dir.join(LATEST_FILE_NAME), &pointer).await;

        tracing::debug!(
            path = %path.display(),
            status = record.response.status,
            "Captured call"
        );
        path
    }

    /// Overwrite the global heartbeat with the loading directory
    pub async fn write_heartbeat(&self, directory: &Path) -> bool {
        let heartbeat = Heartbeat {
            timestamp: iso_timestamp(Utc::now()),
            directory: directory.display().to_string(),
        };
        write_json(&self.root.join(HEARTBEAT_FILE_NAME), &heartbeat).await
    }
}
