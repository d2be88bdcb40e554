// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "LLM Capture";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "llm_capture";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".llm-capture";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "llm-capture.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "LLM_CAPTURE_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "LLM_CAPTURE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "LLM_CAPTURE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "LLM_CAPTURE_LOG";

// =============================================================================
// Environment Variables - Logs
// =============================================================================

/// Environment variable for the capture log root (shared with the SDK)
pub const ENV_LOG_DIR: &str = llm_capture::config::ENV_LOG_DIR;

/// Environment variable for a viewer page on disk
pub const ENV_VIEWER: &str = "LLM_CAPTURE_VIEWER";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 3000;

// =============================================================================
// Shutdown
// =============================================================================

/// Max seconds to wait for in-flight requests after a shutdown signal
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
