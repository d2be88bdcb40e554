use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT};

// =============================================================================
// File Config (JSON)
// =============================================================================

/// Server configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Capture log configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LogsFileConfig {
    pub dir: Option<String>,
}

/// Viewer configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ViewerFileConfig {
    pub path: Option<String>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub logs: Option<LogsFileConfig>,
    pub viewer: Option<ViewerFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(logs) = other.logs {
            let current = self.logs.get_or_insert_with(LogsFileConfig::default);
            if logs.dir.is_some() {
                tracing::trace!(dir = ?logs.dir, "Merging logs.dir");
                current.dir = logs.dir;
            }
        }

        if let Some(viewer) = other.viewer {
            let current = self.viewer.get_or_insert_with(ViewerFileConfig::default);
            if viewer.path.is_some() {
                tracing::trace!(path = ?viewer.path, "Merging viewer.path");
                current.path = viewer.path;
            }
        }
    }
}

// =============================================================================
// Final Config
// =============================================================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct LogsConfig {
    /// Root holding one directory per session
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct ViewerConfig {
    /// Page served at `/`; the built-in page when unset
    pub path: Option<PathBuf>,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logs: LogsConfig,
    pub viewer: ViewerConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.llm-capture/llm-capture.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        Self::load_with_profile(cli, get_profile_config_path().as_deref())
    }

    fn load_with_profile(cli: &CliConfig, profile_path: Option<&Path>) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Profile dir, skipped if missing
        if let Some(profile_path) = profile_path
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let file_server = file_config.server.unwrap_or_default();
        let file_logs = file_config.logs.unwrap_or_default();
        let file_viewer = file_config.viewer.unwrap_or_default();

        // 3. Layer: defaults -> file config -> CLI/env overrides
        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let log_dir = cli
            .log_dir
            .as_ref()
            .map(|p| expand_path(&p.to_string_lossy()))
            .or_else(|| file_logs.dir.as_deref().map(expand_path))
            .unwrap_or_else(llm_capture::config::default_log_root);

        let viewer_path = cli
            .viewer
            .as_ref()
            .map(|p| expand_path(&p.to_string_lossy()))
            .or_else(|| file_viewer.path.as_deref().map(expand_path));

        let config = Self {
            server: ServerConfig { host, port },
            logs: LogsConfig { dir: log_dir },
            viewer: ViewerConfig { path: viewer_path },
        };

        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            log_dir = %config.logs.dir.display(),
            viewer = ?config.viewer.path,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind a random port the viewer cannot be told about
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        Ok(())
    }
}

/// Get the profile config path (~/.llm-capture/llm-capture.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, json: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "logs": { "dir": "/var/llm-dump" },
            "viewer": { "path": "/srv/viewer.html" }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("0.0.0.0".to_string())
        );
        assert_eq!(config.server.as_ref().unwrap().port, Some(8080));
        assert_eq!(
            config.logs.as_ref().unwrap().dir,
            Some("/var/llm-dump".to_string())
        );
        assert_eq!(
            config.viewer.as_ref().unwrap().path,
            Some("/srv/viewer.html".to_string())
        );
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.logs.is_none());
        assert!(config.viewer.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "unknown_field": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("localhost".to_string())
        );
        assert_eq!(config.extra.get("unknown_field").unwrap(), 123);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = FileConfig {
            server: Some(ServerFileConfig {
                host: Some("base.host".to_string()),
                port: Some(1000),
            }),
            logs: Some(LogsFileConfig {
                dir: Some("/base/logs".to_string()),
            }),
            viewer: None,
            extra: serde_json::Value::Null,
        };

        let overlay = FileConfig {
            server: Some(ServerFileConfig {
                host: None,
                port: Some(2000),
            }),
            logs: None,
            viewer: Some(ViewerFileConfig {
                path: Some("/overlay/viewer.html".to_string()),
            }),
            extra: serde_json::Value::Null,
        };

        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host, Some("base.host".to_string()));
        assert_eq!(server.port, Some(2000));
        assert_eq!(base.logs.unwrap().dir, Some("/base/logs".to_string()));
        assert_eq!(
            base.viewer.unwrap().path,
            Some("/overlay/viewer.html".to_string())
        );
    }

    #[test]
    fn test_load_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "empty.json", "{}");
        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };

        let config = AppConfig::load_with_profile(&cli, None).unwrap();
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.logs.dir, llm_capture::config::default_log_root());
        assert!(config.viewer.path.is_none());
    }

    #[test]
    fn test_load_layers_profile_file_and_cli() {
        let dir = TempDir::new().unwrap();
        let profile = write_config(
            &dir,
            "profile.json",
            r#"{ "server": { "host": "0.0.0.0", "port": 4000 }, "logs": { "dir": "/profile/logs" } }"#,
        );
        let overlay = write_config(&dir, "overlay.json", r#"{ "server": { "port": 5000 } }"#);
        let cli = CliConfig {
            config: Some(overlay),
            log_dir: Some(PathBuf::from("/cli/logs")),
            ..Default::default()
        };

        let config = AppConfig::load_with_profile(&cli, Some(&profile)).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.logs.dir, PathBuf::from("/cli/logs"));
    }

    #[test]
    fn test_load_missing_config_file_fails() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/definitely/not/here/llm-capture.json")),
            ..Default::default()
        };
        let err = AppConfig::load_with_profile(&cli, None).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_invalid_json_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "bad.json", "{ not json");
        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        assert!(AppConfig::load_with_profile(&cli, None).is_err());
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "empty.json", "{}");
        let cli = CliConfig {
            config: Some(path),
            port: Some(0),
            ..Default::default()
        };
        let err = AppConfig::load_with_profile(&cli, None).unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_validate_rejects_empty_host() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "empty.json", "{}");
        let cli = CliConfig {
            config: Some(path),
            host: Some("  ".to_string()),
            ..Default::default()
        };
        let err = AppConfig::load_with_profile(&cli, None).unwrap_err();
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(!is_all_interfaces("127.0.0.1"));
    }
}
