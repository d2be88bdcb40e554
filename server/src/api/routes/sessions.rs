//! Session browsing endpoints

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use llm_capture::LatestPointer;

use crate::api::embedded;
use crate::api::types::ApiError;
use crate::data::{LogQueryError, LogReader, SessionEntry, SessionSummary};

/// Shared state for session endpoints
#[derive(Clone)]
pub struct SessionsApiState {
    pub reader: Arc<LogReader>,
    pub viewer: Option<PathBuf>,
}

/// Build viewer and session routes
pub fn routes(reader: Arc<LogReader>, viewer: Option<PathBuf>) -> Router<()> {
    let state = SessionsApiState { reader, viewer };

    Router::new()
        .route("/", get(viewer_page))
        .route("/api/sessions", get(list_sessions))
        .route("/api/session/", get(missing_session_id))
        .route("/api/session/{*id}", get(get_session))
        .route("/api/latest/{*id}", get(get_latest))
        .with_state(state)
}

async fn viewer_page(State(state): State<SessionsApiState>) -> Result<Response, ApiError> {
    embedded::serve_viewer(state.viewer.as_deref()).await
}

async fn list_sessions(
    State(state): State<SessionsApiState>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    state
        .reader
        .list_sessions()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_query(e, "Failed to list sessions"))
}

async fn missing_session_id() -> ApiError {
    ApiError::from_query(LogQueryError::MissingId, "Missing session ID")
}

async fn get_session(
    State(state): State<SessionsApiState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<SessionEntry>>, ApiError> {
    state
        .reader
        .session_records(&id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_query(e, "Failed to read session files"))
}

async fn get_latest(
    State(state): State<SessionsApiState>,
    Path(id): Path<String>,
) -> Result<Json<LatestPointer>, ApiError> {
    state
        .reader
        .latest(&id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_query(e, "Failed to read latest pointer"))
}
