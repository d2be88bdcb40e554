//! On-disk record format

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::snapshot::ResponseType;

/// Per-session pointer to the newest record
pub const LATEST_FILE_NAME: &str = "latest.json";

/// Files with this prefix are pointers, not records
pub const LATEST_FILE_PREFIX: &str = "latest";

/// Global heartbeat written on every plugin load
pub const HEARTBEAT_FILE_NAME: &str = "latest-plugin.json";

/// One intercepted call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub metadata: RecordMetadata,
    pub request: RecordRequest,
    pub response: RecordResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub id: String,
    pub timestamp: String,
    pub duration_ms: u64,
    pub url: String,
    pub method: String,
    pub response_type: ResponseType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRequest {
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

/// Contents of `latest.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestPointer {
    pub latest_file: String,
    pub timestamp: String,
    pub url: String,
    pub status: u16,
    pub duration_ms: u64,
}

impl LatestPointer {
    pub fn for_record(file_name: impl Into<String>, record: &CaptureRecord) -> Self {
        Self {
            latest_file: file_name.into(),
            timestamp: record.metadata.timestamp.clone(),
            url: record.metadata.url.clone(),
            status: record.response.status,
            duration_ms: record.metadata.duration_ms,
        }
    }
}

/// Contents of `latest-plugin.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub timestamp: String,
    pub directory: String,
}

/// Zero-padded sequence id (`0007`)
pub fn sequence_id(seq: u64) -> String {
    format!("{:04}", seq)
}

/// `NNNN-<status>-YYYY-MM-DDTHH-MM-SS.json`
pub fn record_file_name(seq: u64, status: u16, at: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}.json",
        sequence_id(seq),
        status,
        at.format("%Y-%m-%dT%H-%M-%S")
    )
}

/// ISO-8601 UTC with milliseconds (`2024-01-01T12:00:00.000Z`)
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whether a directory entry is a capture record rather than a pointer
pub fn is_record_file_name(name: &str) -> bool {
    name.ends_with(".json") && !name.starts_with(LATEST_FILE_PREFIX)
}

/// Headers as a flat map; repeated values are joined with `", "`.
///
/// Header names are already lower-case. Values that are not valid UTF-8 are
/// decoded lossily.
pub fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    flat
}
