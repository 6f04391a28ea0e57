//! Configuration management

use crate::error::{ErrorContext, GymTrackError, GymTrackResult};
use crate::logging::LoggingConfig;
use crate::types::DEFAULT_WORKOUTS_COLLECTION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration. Missing sections and fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GymTrackConfig {
    pub backend: BackendConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

/// Static identifiers of the remote project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub project_id: String,
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    /// Collection holding workout records
    pub workouts_collection: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Deadline for a single store round trip
    pub request_timeout_ms: u64,
    /// Capacity of the session event channel
    pub event_buffer: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            project_id: "gymtrack-local".to_string(),
            api_key: None,
            auth_domain: None,
            workouts_collection: DEFAULT_WORKOUTS_COLLECTION.to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 15_000,
            event_buffer: 64,
        }
    }
}

/// `<config dir>/gymtrack/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gymtrack").join("config.toml"))
}

impl GymTrackConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> GymTrackResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GymTrackError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: GymTrackConfig = toml::from_str(&content).map_err(|e| GymTrackError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> GymTrackResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| GymTrackError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| GymTrackError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> GymTrackResult<()> {
        if self.backend.project_id.trim().is_empty() {
            return Err(invalid(
                "backend.project_id must not be empty",
                "Set backend.project_id to your project identifier",
            ));
        }

        if self.backend.workouts_collection.trim().is_empty() {
            return Err(invalid(
                "backend.workouts_collection must not be empty",
                "Set backend.workouts_collection, e.g. \"workouts\"",
            ));
        }

        if self.client.request_timeout_ms == 0 {
            return Err(invalid(
                "client.request_timeout_ms must be greater than 0",
                "Set client.request_timeout_ms to a positive value",
            ));
        }

        if self.client.event_buffer == 0 {
            return Err(invalid(
                "client.event_buffer must be greater than 0",
                "Set client.event_buffer to a positive value",
            ));
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(invalid(
                &format!("Unknown log level: {}", self.logging.level),
                "Use one of trace, debug, info, warn, error",
            ));
        }

        if self.logging.log_to_file && self.logging.log_file_path.is_none() {
            return Err(invalid(
                "logging.log_file_path must be set when logging.log_to_file is true",
                "Set logging.log_file_path or disable logging.log_to_file",
            ));
        }

        Ok(())
    }
}

fn invalid(message: &str, suggestion: &str) -> GymTrackError {
    GymTrackError::Config {
        message: message.to_string(),
        source: None,
        context: ErrorContext::new("config")
            .with_operation("validate")
            .with_suggestion(suggestion),
    }
}
