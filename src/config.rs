//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// When false, stores run without persistence
    #[serde(default = "default_storage_enabled")]
    pub enabled: bool,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("provisio").to_string_lossy().to_string())
        .unwrap_or_else(|| "./provisio_data".to_string())
}

fn default_storage_enabled() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            enabled: default_storage_enabled(),
        }
    }
}

impl StorageConfig {
    /// `data_dir` with a leading `~` resolved to the home directory
    pub fn data_path(&self) -> PathBuf {
        expand_home(&self.data_dir, dirs::home_dir())
    }
}

fn expand_home(path: &str, home: Option<PathBuf>) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
    };

    match (rest, home) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base of the `/api` namespace, requests go to `{base_url}/users/{id}`
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Unset means lookups wait as long as the server takes
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_api_url() -> String {
    "http://localhost:5173/api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            request_timeout_secs: None,
        }
    }
}

/// Development proxy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_host")]
    pub host: String,

    #[serde(default = "default_proxy_port")]
    pub port: u16,

    /// Path prefix that is forwarded (and stripped)
    #[serde(default = "default_proxy_prefix")]
    pub prefix: String,

    /// Backend origin requests are forwarded to
    #[serde(default = "default_proxy_target")]
    pub target: String,

    /// Rewrite the Host header to the target's authority
    #[serde(default = "default_change_origin")]
    pub change_origin: bool,
}

fn default_proxy_host() -> String {
    "127.0.0.1".to_string()
}

fn default_proxy_port() -> u16 {
    5173
}

fn default_proxy_prefix() -> String {
    "/api".to_string()
}

fn default_proxy_target() -> String {
    "http://host.docker.internal:8000".to_string()
}

fn default_change_origin() -> bool {
    true
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_proxy_host(),
            port: default_proxy_port(),
            prefix: default_proxy_prefix(),
            target: default_proxy_target(),
            change_origin: default_change_origin(),
        }
    }
}

impl ProxyConfig {
    /// Socket address string to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment.
    ///
    /// Runs before logging is set up, so nothing is logged here; call
    /// [`LoadedConfig::log`] once the subscriber is installed.
    pub fn load_default() -> LoadedConfig {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("provisio").join("config.toml")),
            Some(PathBuf::from("/etc/provisio/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first candidate that exists and parses, else defaults with
    /// environment overrides
    fn load_first(paths: &[PathBuf]) -> LoadedConfig {
        let mut skipped = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: Some(path.clone()),
                        skipped,
                    }
                }
                Err(e) => skipped.push(e),
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            source: None,
            skipped,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(data_dir) = lookup("PROVISIO_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(enabled) = lookup("PROVISIO_STORAGE_ENABLED") {
            self.storage.enabled = enabled.to_lowercase() != "false" && enabled != "0";
        }

        // API overrides
        if let Some(url) = lookup("PROVISIO_API_URL") {
            self.api.base_url = url;
        }

        // Proxy overrides
        if let Some(host) = lookup("PROVISIO_PROXY_HOST") {
            self.proxy.host = host;
        }
        if let Some(port) = lookup("PROVISIO_PROXY_PORT") {
            if let Ok(p) = port.parse() {
                self.proxy.port = p;
            }
        }
        if let Some(target) = lookup("PROVISIO_PROXY_TARGET") {
            self.proxy.target = target;
        }

        // Logging overrides
        if let Some(level) = lookup("PROVISIO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("PROVISIO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Result of the default config search
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,

    /// File the settings came from; `None` means defaults plus environment
    pub source: Option<PathBuf>,

    /// Candidate files that exist but failed to load
    pub skipped: Vec<ConfigError>,
}

impl LoadedConfig {
    /// Report where the config came from and which files were skipped
    pub fn log(&self) {
        for error in &self.skipped {
            tracing::warn!("Skipping config file: {}", error);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::debug!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Provisio Configuration
#
# Environment variables override these settings:
# - PROVISIO_DATA_DIR
# - PROVISIO_STORAGE_ENABLED
# - PROVISIO_API_URL
# - PROVISIO_PROXY_HOST
# - PROVISIO_PROXY_PORT
# - PROVISIO_PROXY_TARGET
# - PROVISIO_LOG_LEVEL
# - PROVISIO_LOG_FORMAT

[storage]
# Directory holding the local storage file. Defaults to the platform's
# local data directory; a leading ~ means the home directory.
# data_dir = "~/.local/share/provisio"

# Set to false to run without persistence
enabled = true

[api]
# Base URL of the API namespace (the dev proxy by default)
base_url = "http://localhost:5173/api"

# Optional request timeout in seconds
# request_timeout_secs = 10

[proxy]
# Development proxy bind address
host = "127.0.0.1"
port = 5173

# Requests under this prefix are forwarded with the prefix stripped
prefix = "/api"

# Backend origin
target = "http://host.docker.internal:8000"

# Rewrite the Host header to the backend's
change_origin = true

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
