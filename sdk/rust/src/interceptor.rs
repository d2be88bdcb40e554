//! Capture interceptor and the process-wide HTTP call slot

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::config::{CaptureConfig, CaptureToggle};
use crate::error::TransportError;
use crate::record::{
    CaptureRecord, RecordMetadata, RecordRequest, RecordResponse, flatten_headers, iso_timestamp,
    sequence_id,
};
use crate::snapshot::{snapshot_request_body, snapshot_response};
use crate::store::LogStore;
use crate::transport::{CallInit, CallInput, CallResponse, HttpCall, ReqwestTransport};

/// Request headers carrying the session token, highest priority first
pub const SESSION_HEADERS: [&str; 3] = [
    "x-opencode-debug-session",
    "x-opencode-session",
    "x-opencode-request",
];

/// Wraps an [`HttpCall`] and records every exchange while capture is on
pub struct CaptureInterceptor<T> {
    inner: T,
    store: LogStore,
    toggle: CaptureToggle,
    counter: AtomicU64,
}

impl<T: HttpCall> CaptureInterceptor<T> {
    pub fn new(inner: T, config: CaptureConfig) -> Self {
        Self {
            inner,
            store: LogStore::new(config.log_root),
            toggle: config.toggle,
            counter: AtomicU64::new(0),
        }
    }

    /// Number of calls captured since creation
    pub fn captured_calls(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }
}

#[async_trait]
impl<T: HttpCall> HttpCall for CaptureInterceptor<T> {
    async fn call(
        &self,
        input: CallInput,
        init: Option<CallInit>,
    ) -> Result<CallResponse, TransportError> {
        if !self.toggle.is_enabled() {
            return self.inner.call(input, init).await;
        }

        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;

        let url = input.url();
        let method = input.method(init.as_ref()).to_string();
        let request_headers = input
            .headers(init.as_ref())
            .map(flatten_headers)
            .unwrap_or_default();
        let token = SESSION_HEADERS
            .iter()
            .find_map(|name| request_headers.get(*name))
            .map(String::as_str);
        let session_dir = self.store.session_dir(token);
        let request_body = snapshot_request_body(&input, init.as_ref());

        let start = Instant::now();
        let mut response = self.inner.call(input, init).await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        let snapshot = snapshot_response(response.clone_response()).await;
        let at = Utc::now();

        let record = CaptureRecord {
            metadata: RecordMetadata {
                id: sequence_id(seq),
                timestamp: iso_timestamp(at),
                duration_ms,
                url,
                method,
                response_type: snapshot.kind,
            },
            request: RecordRequest {
                headers: request_headers,
                body: request_body,
            },
            response: RecordResponse {
                status: response.status().as_u16(),
                status_text: response.status_text().to_string(),
                headers: flatten_headers(response.headers()),
                body: snapshot.body,
            },
        };

        self.store.write_capture(&session_dir, seq, &record, at).await;

        Ok(response)
    }
}

/// The swappable, process-wide HTTP call function.
///
/// Hosts dispatch through [`HttpCallSlot::fetch`]. Installing capture replaces
/// the current function with a [`CaptureInterceptor`] around it, at most once
/// per slot.
pub struct HttpCallSlot {
    current: RwLock<Arc<dyn HttpCall>>,
    installed: AtomicBool,
}

static GLOBAL_SLOT: LazyLock<HttpCallSlot> =
    LazyLock::new(|| HttpCallSlot::new(Arc::new(ReqwestTransport::new())));

impl HttpCallSlot {
    pub fn new(call: Arc<dyn HttpCall>) -> Self {
        Self {
            current: RwLock::new(call),
            installed: AtomicBool::new(false),
        }
    }

    /// The slot shared by the whole process, backed by [`ReqwestTransport`]
    pub fn global() -> &'static HttpCallSlot {
        &GLOBAL_SLOT
    }

    /// Currently installed call function
    pub fn current(&self) -> Arc<dyn HttpCall> {
        self.current.read().clone()
    }

    pub async fn fetch(
        &self,
        input: impl Into<CallInput>,
        init: Option<CallInit>,
    ) -> Result<CallResponse, TransportError> {
        let call = self.current();
        call.call(input.into(), init).await
    }

    /// Wrap the current function with capture.
    ///
    /// Returns `None` when capture is already installed; the slot is left
    /// untouched so a second load never stacks another layer.
    pub fn install_capture(
        &self,
        config: CaptureConfig,
    ) -> Option<Arc<CaptureInterceptor<Arc<dyn HttpCall>>>> {
        if self.installed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Capture already installed, skipping");
            return None;
        }

        let mut current = self.current.write();
        let interceptor = Arc::new(CaptureInterceptor::new(current.clone(), config));
        let wrapped: Arc<dyn HttpCall> = interceptor.clone();
        *current = wrapped;

        tracing::debug!(log_root = %interceptor.store().root().display(), "Capture installed");
        Some(interceptor)
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }
}
