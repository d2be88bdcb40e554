//! Capture configuration

use std::path::{Path, PathBuf};

/// Environment variable that switches capture on
pub const ENV_CAPTURE: &str = "OPENCODE_LLM_CAPTURE";

/// Environment variable overriding the log root
pub const ENV_LOG_DIR: &str = "LLM_CAPTURE_DIR";

/// Log root relative to the home directory
const DEFAULT_LOG_ROOT: [&str; 4] = [".config", "opencode", "opencode-llm-capture", "llm-dump"];

/// Only these literal values enable capture.
pub fn is_enabled_value(value: &str) -> bool {
    matches!(value, "true" | "1")
}

/// Default log root: `~/.config/opencode/opencode-llm-capture/llm-dump`
pub fn default_log_root() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    DEFAULT_LOG_ROOT
        .iter()
        .fold(home, |path, segment| path.join(segment))
}

/// Decides per call whether the interceptor records anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureToggle {
    /// Read the named environment variable on every call
    Env(String),
    /// Fixed on/off, independent of the environment
    Fixed(bool),
}

impl Default for CaptureToggle {
    fn default() -> Self {
        Self::Env(ENV_CAPTURE.to_string())
    }
}

impl CaptureToggle {
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Env(name) => std::env::var(name)
                .map(|v| is_enabled_value(&v))
                .unwrap_or(false),
            Self::Fixed(enabled) => *enabled,
        }
    }
}

/// Where records are written and when capture is active
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub log_root: PathBuf,
    pub toggle: CaptureToggle,
}

impl CaptureConfig {
    /// Config rooted at `log_root`, toggled by `OPENCODE_LLM_CAPTURE`
    pub fn new(log_root: impl AsRef<Path>) -> Self {
        Self {
            log_root: log_root.as_ref().to_path_buf(),
            toggle: CaptureToggle::default(),
        }
    }

    /// Config from `LLM_CAPTURE_DIR` (or the default root)
    pub fn from_env() -> Self {
        let log_root = std::env::var(ENV_LOG_DIR)
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_log_root);
        Self::new(log_root)
    }

    pub fn with_toggle(mut self, toggle: CaptureToggle) -> Self {
        self.toggle = toggle;
        self
    }
}
