//! Body snapshots
//!
//! Turns request and response payloads into JSON values that are always safe
//! to serialize. Snapshotting never touches the body the caller receives: the
//! response snapshot reads a duplicated handle, and request bodies are only
//! inspected when they are plain strings.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::transport::{CallInit, CallInput, CallResponse, RequestBody};

/// Longest text body kept verbatim, in characters
pub const MAX_TEXT_CHARS: usize = 5000;

/// Appended to text bodies cut at [`MAX_TEXT_CHARS`]
pub const TRUNCATION_SUFFIX: &str = "…(truncated)";

/// Recorded in place of a body that cannot be read without consuming it
pub const UNREADABLE_BODY_MARKER: &str = "(stream/unreadable body)";

/// Classification of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Empty,
    Stream,
    Json,
    Text,
    Error,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Stream => "stream",
            Self::Json => "json",
            Self::Text => "text",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified body and its serializable form
#[derive(Debug, Clone, PartialEq)]
pub struct BodySnapshot {
    pub kind: ResponseType,
    pub body: Value,
}

impl BodySnapshot {
    fn new(kind: ResponseType, body: Value) -> Self {
        Self { kind, body }
    }
}

/// Server-sent events are recognised by a `data:` field at the start of any line
pub fn is_sse(text: &str) -> bool {
    text.starts_with("data:") || text.contains("\ndata:")
}

/// Cut `text` to [`MAX_TEXT_CHARS`] characters, marking the cut
pub fn truncate_text(text: &str) -> String {
    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_SUFFIX),
        None => text.to_string(),
    }
}

/// Classify an already-read body
pub fn classify_text(text: &str) -> BodySnapshot {
    if text.is_empty() {
        return BodySnapshot::new(ResponseType::Empty, Value::Null);
    }

    if is_sse(text) {
        let lines: Vec<&str> = text.split('\n').collect();
        return BodySnapshot::new(
            ResponseType::Stream,
            json!({
                "type": "sse-stream",
                "preview": lines,
                "totalLines": lines.len(),
                "truncated": false,
            }),
        );
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => BodySnapshot::new(ResponseType::Json, value),
        Err(_) => BodySnapshot::new(ResponseType::Text, Value::String(truncate_text(text))),
    }
}

/// Read a duplicated response to the end and classify it.
///
/// Total: a failed read becomes an `error` snapshot carrying the message.
pub async fn snapshot_response(response: CallResponse) -> BodySnapshot {
    match response.text().await {
        Ok(text) => classify_text(&text),
        Err(e) => {
            tracing::debug!(error = %e, "Response body unreadable for capture");
            BodySnapshot::new(ResponseType::Error, json!({ "readError": e.to_string() }))
        }
    }
}

/// Snapshot of the outgoing request body.
///
/// A string passed in `init` is parsed as JSON, falling back to the raw
/// string. A body attached to a request object is a one-shot stream and is
/// only marked, never read.
pub fn snapshot_request_body(input: &CallInput, init: Option<&CallInit>) -> Value {
    if let Some(RequestBody::Text(text)) = init.and_then(|init| init.body.as_ref())
        && !text.is_empty()
    {
        return serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()));
    }

    match input {
        CallInput::Request(request) if request.body.is_some() => {
            Value::String(UNREADABLE_BODY_MARKER.to_string())
        }
        _ => Value::Null,
    }
}
