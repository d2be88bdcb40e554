//! Read-only access to the capture log root
//!
//! Layout: `<root>/<session>/NNNN-<status>-<timestamp>.json` plus a
//! `latest.json` pointer per session, as written by the capture SDK.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use llm_capture::LatestPointer;
use llm_capture::record::{LATEST_FILE_NAME, is_record_file_name};
use serde::Serialize;
use serde_json::Value;

use super::error::LogQueryError;
use crate::utils::file::{modified_millis, resolve_within};

/// Session directory summary for the session list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub name: String,
    /// Capture records, excluding pointer files
    pub count: usize,
    /// Directory modification time, ms since epoch
    pub mtime: u64,
}

/// One capture record file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionEntry {
    pub name: String,
    pub data: Value,
}

/// JS-style truthiness, used to vet record sections
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Record files of a session directory, sorted by name
async fn record_names(dir: &Path) -> Result<Vec<String>, LogQueryError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| LogQueryError::io(dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LogQueryError::io(dir, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_record_file_name(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[derive(Debug, Clone)]
pub struct LogReader {
    root: PathBuf,
}

impl LogReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All session directories, most recently modified first.
    ///
    /// A missing root is an empty list, not an error.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, LogQueryError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(root = %self.root.display(), "Log root does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(LogQueryError::io(&self.root, e)),
        };

        let mut sessions = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LogQueryError::io(&self.root, e))?
        {
            let path = entry.path();
            let metadata = match entry.metadata().await {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Skipping unreadable entry");
                    continue;
                }
            };
            if !metadata.is_dir() {
                continue;
            }

            let count = match record_names(&path).await {
                Ok(names) => names.len(),
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "Skipping unreadable session");
                    continue;
                }
            };
            sessions.push(SessionSummary {
                name: entry.file_name().to_string_lossy().into_owned(),
                count,
                mtime: modified_millis(&metadata),
            });
        }

        sessions.sort_by(|a, b| b.mtime.cmp(&a.mtime).then_with(|| a.name.cmp(&b.name)));
        tracing::trace!(count = sessions.len(), "Listed sessions");
        Ok(sessions)
    }

    /// Every well-formed record of a session, ordered by file name.
    ///
    /// Files that fail to parse or lack `metadata`, `request` or `response`
    /// are skipped with a warning.
    pub async fn session_records(&self, id: &str) -> Result<Vec<SessionEntry>, LogQueryError> {
        let dir = self.session_dir(id).await?;

        let mut records = Vec::new();
        for name in record_names(&dir).await? {
            let path = dir.join(&name);

            let content = match tokio::fs::read_to_string(&path).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, file = %name, path = %path.display(), "Failed to read log");
                    continue;
                }
            };

            let data: Value = match serde_json::from_str(&content) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = %e, file = %name, path = %path.display(), "Failed to parse log");
                    continue;
                }
            };

            let has_metadata = is_truthy(data.get("metadata"));
            let has_request = is_truthy(data.get("request"));
            let has_response = is_truthy(data.get("response"));
            if !(has_metadata && has_request && has_response) {
                tracing::warn!(
                    file = %name,
                    path = %path.display(),
                    has_metadata,
                    has_request,
                    has_response,
                    "Invalid log structure"
                );
                continue;
            }

            records.push(SessionEntry { name, data });
        }

        tracing::trace!(session = id, count = records.len(), "Read session records");
        Ok(records)
    }

    /// The session's `latest.json` pointer
    pub async fn latest(&self, id: &str) -> Result<LatestPointer, LogQueryError> {
        let path = self.session_dir(id).await?.join(LATEST_FILE_NAME);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LogQueryError::NotFound(id.to_string()));
            }
            Err(e) => return Err(LogQueryError::io(&path, e)),
        };

        serde_json::from_str(&content).map_err(|source| LogQueryError::Parse { path, source })
    }

    /// Existing session directory for `id`, checked lexically against the root first
    async fn session_dir(&self, id: &str) -> Result<PathBuf, LogQueryError> {
        if id.is_empty() {
            return Err(LogQueryError::MissingId);
        }

        let dir = resolve_within(&self.root, id)
            .ok_or_else(|| LogQueryError::OutsideRoot(id.to_string()))?;

        match tokio::fs::metadata(&dir).await {
            Ok(m) if m.is_dir() => Ok(dir),
            Ok(_) => Err(LogQueryError::NotFound(id.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(LogQueryError::NotFound(id.to_string()))
            }
            Err(e) => Err(LogQueryError::io(&dir, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(id: &str) -> Value {
        json!({
            "metadata": { "id": id, "responseType": "json" },
            "request": { "headers": {}, "body": null },
            "response": { "status": 200, "body": { "ok": true } }
        })
    }

    async fn write(path: PathBuf, value: &Value) {
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, serde_json::to_string_pretty(value).unwrap())
            .await
            .unwrap();
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&Value::Null)));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(is_truthy(Some(&json!({}))));
        assert!(is_truthy(Some(&json!([]))));
        assert!(is_truthy(Some(&json!("x"))));
        assert!(is_truthy(Some(&json!(1))));
    }

    #[tokio::test]
    async fn test_list_sessions_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let reader = LogReader::new(dir.path().join("does-not-exist"));
        assert!(reader.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_sessions_counts_records_only() {
        let dir = TempDir::new().unwrap();
        let session = dir.path().join("ses_1");
        write(session.join("0001-200-2024-01-01T00-00-00.json"), &record("0001")).await;
        write(session.join("0002-200-2024-01-01T00-00-01.json"), &record("0002")).await;
        write(session.join(LATEST_FILE_NAME), &json!({})).await;
        write(session.join("notes.txt"), &json!("x")).await;
        write(dir.path().join("latest-plugin.json"), &json!({})).await;

        let reader = LogReader::new(dir.path());
        let sessions = reader.list_sessions().await.unwrap();

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].name, "ses_1");
        assert_eq!(sessions[0].count, 2);
        assert!(sessions[0].mtime > 0);
    }

    #[tokio::test]
    async fn test_list_sessions_includes_date_directories() {
        let dir = TempDir::new().unwrap();
        tokio::fs::create_dir_all(dir.path().join("2024-01-01")).await.unwrap();
        tokio::fs::create_dir_all(dir.path().join("ses_a")).await.unwrap();

        let reader = LogReader::new(dir.path());
        let mut names: Vec<String> = reader
            .list_sessions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["2024-01-01", "ses_a"]);
    }

    fn set_dir_mtime(path: &Path, at: std::time::SystemTime) {
        std::fs::File::open(path).unwrap().set_modified(at).unwrap();
    }

    #[tokio::test]
    async fn test_list_sessions_newest_first_then_by_name() {
        let dir = TempDir::new().unwrap();
        for name in ["ses_old", "ses_b", "ses_a", "ses_new"] {
            tokio::fs::create_dir_all(dir.path().join(name)).await.unwrap();
        }

        let now = std::time::SystemTime::now();
        let secs = std::time::Duration::from_secs;
        set_dir_mtime(&dir.path().join("ses_old"), now - secs(300));
        set_dir_mtime(&dir.path().join("ses_a"), now - secs(100));
        set_dir_mtime(&dir.path().join("ses_b"), now - secs(100));
        set_dir_mtime(&dir.path().join("ses_new"), now);

        let reader = LogReader::new(dir.path());
        let sessions = reader.list_sessions().await.unwrap();
        let names: Vec<&str> = sessions.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["ses_new", "ses_a", "ses_b", "ses_old"]);
        assert!(sessions[0].mtime > sessions[1].mtime);
        assert_eq!(sessions[1].mtime, sessions[2].mtime);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_sessions_skips_unreadable_session() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("ses_locked");
        tokio::fs::create_dir_all(&locked).await.unwrap();
        tokio::fs::create_dir_all(dir.path().join("ses_open")).await.unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can still read the directory
        let readable = std::fs::read_dir(&locked).is_ok();

        let reader = LogReader::new(dir.path());
        let result = reader.list_sessions().await;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        let names: Vec<String> = result.unwrap().into_iter().map(|s| s.name).collect();
        assert!(names.contains(&"ses_open".to_string()));
        assert_eq!(names.contains(&"ses_locked".to_string()), readable);
    }

    #[tokio::test]
    async fn test_session_records_skips_invalid_files() {
        let dir = TempDir::new().unwrap();
        let session = dir.path().join("ses_1");
        write(session.join("0002-200-b.json"), &record("0002")).await;
        write(session.join("0001-200-a.json"), &record("0001")).await;
        write(session.join("0003-200-c.json"), &json!({"metadata": {}, "request": {}})).await;
        tokio::fs::write(session.join("0004-200-d.json"), "{ broken")
            .await
            .unwrap();
        write(session.join(LATEST_FILE_NAME), &json!({"latestFile": "x"})).await;

        let reader = LogReader::new(dir.path());
        let records = reader.session_records("ses_1").await.unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["0001-200-a.json", "0002-200-b.json"]);
        assert_eq!(records[0].data["metadata"]["id"], "0001");
    }

    #[tokio::test]
    async fn test_session_records_errors() {
        let dir = TempDir::new().unwrap();
        let reader = LogReader::new(dir.path());

        assert!(matches!(
            reader.session_records("").await,
            Err(LogQueryError::MissingId)
        ));
        assert!(matches!(
            reader.session_records("../etc").await,
            Err(LogQueryError::OutsideRoot(_))
        ));
        assert!(matches!(
            reader.session_records("ses_missing").await,
            Err(LogQueryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_session_path_that_is_a_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("latest-plugin.json"), "{}")
            .await
            .unwrap();

        let reader = LogReader::new(dir.path());
        assert!(matches!(
            reader.session_records("latest-plugin.json").await,
            Err(LogQueryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_latest_pointer() {
        let dir = TempDir::new().unwrap();
        let session = dir.path().join("ses_1");
        write(
            session.join(LATEST_FILE_NAME),
            &json!({
                "latestFile": "0001-200-2024-01-01T00-00-00.json",
                "timestamp": "2024-01-01T00:00:00.000Z",
                "url": "https://example.com",
                "status": 200,
                "durationMs": 5
            }),
        )
        .await;

        let reader = LogReader::new(dir.path());
        let latest = reader.latest("ses_1").await.unwrap();
        assert_eq!(latest.latest_file, "0001-200-2024-01-01T00-00-00.json");
        assert_eq!(latest.status, 200);

        tokio::fs::create_dir_all(dir.path().join("ses_empty")).await.unwrap();
        assert!(matches!(
            reader.latest("ses_empty").await,
            Err(LogQueryError::NotFound(_))
        ));
    }
}
