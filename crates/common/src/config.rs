//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Booth timing and layout defaults.
    pub booth: BoothDefaults,

    /// Hosted backend settings.
    pub backend: BackendConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default booth parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoothDefaults {
    /// Countdown start value for each shot.
    pub countdown_from: u32,

    /// Milliseconds between countdown ticks.
    pub tick_ms: u64,

    /// Pause between a capture and the next countdown (milliseconds).
    pub shot_delay_ms: u64,

    /// Default strip layout ("3x2", "4x2", "2x2").
    pub layout: String,

    /// Quiet window before a style change triggers recomposition
    /// (milliseconds).
    pub restyle_debounce_ms: u64,
}

/// Hosted backend endpoint settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Service base URL (empty = offline, nothing is persisted).
    pub base_url: String,

    /// Public API key sent with every request.
    pub api_key: String,
}

impl BackendConfig {
    /// Whether a hosted backend has been configured.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "picapica=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            booth: BoothDefaults::default(),
            backend: BackendConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for BoothDefaults {
    fn default() -> Self {
        Self {
            countdown_from: 3,
            tick_ms: 1000,
            shot_delay_ms: 500,
            layout: "3x2".to_string(),
            restyle_debounce_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("picapica").join("config.json")
}
