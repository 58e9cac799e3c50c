//! Configuration file support for the zone editor.
//!
//! Settings are stored as JSON. Every field has a default, so a partial file
//! (or no file at all) yields a usable configuration. Environment variables
//! override the backend location and credentials.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_AUTOSAVE_DELAY, DEFAULT_BACKEND_URL, DEFAULT_REQUEST_TIMEOUT};

/// Environment variable overriding [`EditorConfig::backend_url`].
pub const ENV_BACKEND_URL: &str = "ROI_BACKEND_URL";

/// Environment variable overriding [`EditorConfig::auth_token`].
pub const ENV_AUTH_TOKEN: &str = "ROI_AUTH_TOKEN";

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Zone editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Base URL of the settings backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Bearer token sent with every backend request
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Quiet period before an autosave, in milliseconds
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,

    /// Corner handle grab distance in CSS pixels
    #[serde(default = "default_handle_tolerance_px")]
    pub handle_tolerance_px: f64,

    /// Smallest normalized zone width/height
    #[serde(default = "default_min_zone_size")]
    pub min_zone_size: f64,

    /// Backend request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_autosave_delay_ms() -> u64 {
    DEFAULT_AUTOSAVE_DELAY.as_millis() as u64
}

fn default_handle_tolerance_px() -> f64 {
    roi_geom::DEFAULT_HANDLE_TOLERANCE
}

fn default_min_zone_size() -> f64 {
    roi_geom::MIN_ZONE_SIZE
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}

impl EditorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            backend_url: default_backend_url(),
            auth_token: None,
            autosave_delay_ms: default_autosave_delay_ms(),
            handle_tolerance_px: default_handle_tolerance_px(),
            min_zone_size: default_min_zone_size(),
            request_timeout_ms: default_request_timeout_ms(),
            log_level: LogLevel::default(),
        }
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend_url.trim().is_empty() {
            return Err(ConfigError::invalid("backend_url must not be empty"));
        }
        if !(self.handle_tolerance_px.is_finite() && self.handle_tolerance_px > 0.0) {
            return Err(ConfigError::invalid(format!(
                "handle_tolerance_px must be positive, got {}",
                self.handle_tolerance_px
            )));
        }
        if !(self.min_zone_size > 0.0 && self.min_zone_size <= 0.5) {
            return Err(ConfigError::invalid(format!(
                "min_zone_size must be in (0, 0.5], got {}",
                self.min_zone_size
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::invalid("request_timeout_ms must be non-zero"));
        }
        Ok(())
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Apply overrides from a lookup function (normally the process environment).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            log::debug!("Backend URL overridden by {}", ENV_BACKEND_URL);
            self.backend_url = url;
        }
        if let Some(token) = lookup(ENV_AUTH_TOKEN).filter(|v| !v.is_empty()) {
            self.auth_token = Some(token);
        }
        self
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "roizone.json"
    }

    /// Get the default config file path.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("roizone").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("roizone")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load from `path`, falling back to defaults when the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A value is out of range
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}
