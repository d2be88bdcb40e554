//! API server initialization

use std::future::IntoFuture;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::middleware;
use super::routes::{health, sessions};
use crate::core::config::AppConfig;
use crate::core::constants::SHUTDOWN_TIMEOUT_SECS;
use crate::core::shutdown::ShutdownService;
use crate::data::LogReader;

/// Full application router over a log root
pub fn router(reader: Arc<LogReader>, viewer: Option<PathBuf>) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .merge(sessions::routes(reader, viewer))
        .fallback(middleware::handle_404)
        .layer(middleware::cors())
        .layer(axum::middleware::from_fn(middleware::preflight))
        .layer(TraceLayer::new_for_http())
}

pub struct ApiServer {
    config: AppConfig,
    shutdown: ShutdownService,
}

impl ApiServer {
    pub fn new(config: AppConfig, shutdown: ShutdownService) -> Self {
        Self { config, shutdown }
    }

    /// Serve until shutdown is triggered, then drain for a bounded time
    pub async fn start(self) -> Result<()> {
        let Self { config, shutdown } = self;

        let reader = Arc::new(LogReader::new(config.logs.dir));
        let app = router(reader, config.viewer.path);

        let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
            .await
            .with_context(|| {
                format!(
                    "Failed to bind {}:{}",
                    config.server.host, config.server.port
                )
            })?;
        tracing::debug!(addr = ?listener.local_addr().ok(), "HTTP server listening");

        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.wait())
            .into_future();

        let drain_deadline = async {
            shutdown.wait().await;
            tokio::time::sleep(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS)).await;
        };

        tokio::select! {
            result = serve => result?,
            _ = drain_deadline => {
                tracing::warn!(
                    timeout_secs = SHUTDOWN_TIMEOUT_SECS,
                    "Shutdown timeout elapsed, dropping open connections"
                );
            }
        }

        tracing::debug!("HTTP server stopped");
        Ok(())
    }
}
