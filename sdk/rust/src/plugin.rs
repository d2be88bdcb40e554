//! Host plugin entry point and the `chat.headers` hook

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::CaptureConfig;
use crate::interceptor::{HttpCallSlot, SESSION_HEADERS};
use crate::store::LogStore;

/// Header the hook stamps on outgoing chat calls
pub const DEBUG_SESSION_HEADER: &str = SESSION_HEADERS[0];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHeadersInput {
    #[serde(rename = "sessionID")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHeadersOutput {
    pub headers: HashMap<String, String>,
}

/// Stamp the session token onto a call's headers.
///
/// Existing markers are kept, whatever their case. Never fails.
pub fn chat_headers(input: &ChatHeadersInput, output: &mut ChatHeadersOutput) {
    let Some(session_id) = input.session_id.as_deref().filter(|id| !id.is_empty()) else {
        return;
    };

    let present = output.headers.iter().any(|(name, value)| {
        name.eq_ignore_ascii_case(DEBUG_SESSION_HEADER) && !value.is_empty()
    });
    if present {
        return;
    }

    output
        .headers
        .insert(DEBUG_SESSION_HEADER.to_string(), session_id.to_string());
}

/// Hooks handed back to the host after loading
#[derive(Debug, Clone, Copy, Default)]
pub struct Hooks;

impl Hooks {
    /// `chat.headers`: runs before each provider call
    pub fn chat_headers(&self, input: &ChatHeadersInput, output: &mut ChatHeadersOutput) {
        chat_headers(input, output);
    }
}

/// Load the plugin for a host started in `directory`.
///
/// Creates the log root, records the heartbeat and wraps the slot's call
/// function with capture (once per slot). Storage failures are logged and
/// never prevent the hooks from being returned.
pub async fn load(directory: &Path, config: CaptureConfig, slot: &HttpCallSlot) -> Hooks {
    let store = LogStore::new(&config.log_root);

    if let Err(e) = store.ensure_root().await {
        tracing::warn!(error = %e, "Failed to create capture log root");
    }
    store.write_heartbeat(directory).await;

    if slot.install_capture(config).is_some() {
        tracing::info!(
            log_root = %store.root().display(),
            directory = %directory.display(),
            "LLM capture plugin loaded"
        );
    }

    Hooks
}
