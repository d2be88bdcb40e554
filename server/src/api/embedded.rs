//! Viewer page embedding
//!
//! The bundled `viewer.html` is compiled into the binary from `web/`.
//! A viewer path from config replaces it and is read from disk per request.

use std::path::Path;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

use super::types::ApiError;

#[derive(RustEmbed)]
#[folder = "web"]
pub struct Assets;

pub const VIEWER_FILE: &str = "viewer.html";

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const CACHE_REVALIDATE: &str = "public, max-age=0, must-revalidate";

fn html(body: Vec<u8>, etag: Option<String>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(HTML_CONTENT_TYPE),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_REVALIDATE),
    );
    if let Some(value) = etag.and_then(|tag| HeaderValue::from_str(&format!("\"{}\"", tag)).ok()) {
        headers.insert(header::ETAG, value);
    }
    (StatusCode::OK, headers, Body::from(body)).into_response()
}

fn viewer_missing() -> ApiError {
    ApiError::not_found("viewer.html not found")
}

/// Serve the viewer page, from `override_path` when configured
pub async fn serve_viewer(override_path: Option<&Path>) -> Result<Response, ApiError> {
    if let Some(path) = override_path {
        return match tokio::fs::read(path).await {
            Ok(body) => Ok(html(body, None)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Configured viewer not found");
                Err(viewer_missing())
            }
            Err(e) => {
                tracing::error!(error = %e, path = %path.display(), "Failed to read viewer");
                Err(ApiError::internal("Failed to load viewer"))
            }
        };
    }

    let file = Assets::get(VIEWER_FILE).ok_or_else(viewer_missing)?;
    let etag = hex::encode(file.metadata.sha256_hash());
    Ok(html(file.data.into_owned(), Some(etag)))
}
