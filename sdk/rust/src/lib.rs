//! # LLM Capture
//!
//! Records every outbound HTTP exchange of an LLM-agent runtime into
//! per-session JSON files without changing what the runtime sees.
//!
//! The process-wide HTTP call function is an [`HttpCallSlot`]. Loading the
//! plugin installs a [`CaptureInterceptor`] into that slot exactly once:
//!
//! ```no_run
//! # async fn demo() -> Result<(), llm_capture::TransportError> {
//! use llm_capture::{CaptureConfig, HttpCallSlot, plugin};
//!
//! let slot = HttpCallSlot::global();
//! let hooks = plugin::load(std::path::Path::new("."), CaptureConfig::from_env(), slot).await;
//!
//! let response = slot.fetch("https://example.com/api", None).await?;
//! let body = response.text().await;
//! # let _ = (hooks, body);
//! # Ok(())
//! # }
//! ```
//!
//! Capture only happens when `OPENCODE_LLM_CAPTURE` is `true` or `1`; in every
//! other case the interceptor is a passthrough. Records land under
//! `<log root>/<session>/NNNN-<status>-<timestamp>.json` next to a
//! `latest.json` pointer.

pub mod config;
pub mod error;
pub mod interceptor;
pub mod plugin;
pub mod record;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod transport;

pub use config::{CaptureConfig, CaptureToggle};
pub use error::{BodyError, StoreError, TransportError};
pub use interceptor::{CaptureInterceptor, HttpCallSlot};
pub use plugin::{ChatHeadersInput, ChatHeadersOutput, Hooks};
pub use record::{CaptureRecord, LatestPointer};
pub use snapshot::{BodySnapshot, ResponseType};
pub use store::LogStore;
pub use transport::{
    CallInit, CallInput, CallRequest, CallResponse, HttpCall, ReqwestTransport, RequestBody,
    ResponseBody,
};
