//! Configuration management for the TrafficPulse dashboard
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TrafficPulseError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the TomTom API key
pub const API_KEY_ENV: &str = "TOMTOM_API_KEY";

/// Root configuration structure for the TrafficPulse dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficPulseConfig {
    /// TomTom API configuration
    pub tomtom: TomTomConfig,
    /// Location autocomplete settings
    pub suggestions: SuggestionConfig,
    /// Map view settings
    pub map: MapConfig,
    /// Dashboard settings
    pub dashboard: DashboardConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Web server settings
    pub server: ServerConfig,
}

/// TomTom API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomTomConfig {
    /// API key for search, routing and map tiles
    pub api_key: Option<String>,
    /// Base URL for the TomTom REST APIs
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Retries for transient failures, 0 disables retrying
    pub max_retries: u32,
    /// Travel mode passed to the routing API
    pub travel_mode: String,
}

/// Location autocomplete settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Quiet period after the last keystroke before searching
    pub debounce_ms: u64,
    /// Minimum trimmed query length that triggers a search
    pub min_query_len: usize,
    /// Maximum number of candidates per search
    pub max_results: usize,
}

/// Map view settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub default_zoom: f64,
    /// Refresh interval handed to the traffic overlays
    pub traffic_refresh_seconds: u32,
    /// Padding in pixels when fitting the view to a route
    pub route_padding: u32,
}

/// Dashboard settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// City selected on startup
    pub default_city: String,
    /// Interval of the "last updated" refresh
    pub refresh_interval_seconds: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory with the built frontend
    pub static_dir: String,
}

// Default value functions
fn default_tomtom_base_url() -> String {
    "https://api.tomtom.com".to_string()
}

fn default_tomtom_timeout() -> u32 {
    10
}

fn default_travel_mode() -> String {
    "car".to_string()
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    3
}

fn default_max_results() -> usize {
    5
}

fn default_zoom() -> f64 {
    12.0
}

fn default_traffic_refresh() -> u32 {
    60
}

fn default_route_padding() -> u32 {
    50
}

fn default_city() -> String {
    "delhi".to_string()
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "frontend/dist".to_string()
}

impl Default for TomTomConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_tomtom_base_url(),
            timeout_seconds: default_tomtom_timeout(),
            max_retries: 0,
            travel_mode: default_travel_mode(),
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            max_results: default_max_results(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_zoom: default_zoom(),
            traffic_refresh_seconds: default_traffic_refresh(),
            route_padding: default_route_padding(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            refresh_interval_seconds: default_refresh_interval(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl SuggestionConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl DashboardConfig {
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }
}

impl TrafficPulseConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRAFFICPULSE_TOMTOM__API_KEY, TRAFFICPULSE_SERVER__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("TRAFFICPULSE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TrafficPulseConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.tomtom.api_key.is_none() {
            config.tomtom.api_key = std::env::var(API_KEY_ENV).ok();
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trafficpulse").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        // A blank key means "not configured", not "invalid"
        if self
            .tomtom
            .api_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.tomtom.api_key = None;
        }
        if self.tomtom.base_url.is_empty() {
            self.tomtom.base_url = default_tomtom_base_url();
        }
        if self.tomtom.timeout_seconds == 0 {
            self.tomtom.timeout_seconds = default_tomtom_timeout();
        }
        if self.tomtom.travel_mode.is_empty() {
            self.tomtom.travel_mode = default_travel_mode();
        }
        if self.suggestions.min_query_len == 0 {
            self.suggestions.min_query_len = default_min_query_len();
        }
        if self.suggestions.max_results == 0 {
            self.suggestions.max_results = default_max_results();
        }
        if self.map.traffic_refresh_seconds == 0 {
            self.map.traffic_refresh_seconds = default_traffic_refresh();
        }
        if self.dashboard.default_city.is_empty() {
            self.dashboard.default_city = default_city();
        }
        if self.dashboard.refresh_interval_seconds == 0 {
            self.dashboard.refresh_interval_seconds = default_refresh_interval();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
    }

    /// Whether an API key is available
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.tomtom.api_key.is_some()
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        // The key is optional: without it the dashboard runs in "not configured" mode
        if let Some(api_key) = &self.tomtom.api_key {
            if api_key.trim().is_empty() {
                return Err(TrafficPulseError::config(
                    "TomTom API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 {
                return Err(TrafficPulseError::config(
                    "TomTom API key appears to be invalid (too short). Please check your API key."
                ).into());
            }

            if api_key.len() > 100 {
                return Err(TrafficPulseError::config(
                    "TomTom API key appears to be invalid (too long). Please check your API key."
                ).into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.tomtom.timeout_seconds > 120 {
            return Err(TrafficPulseError::config(
                "TomTom API timeout cannot exceed 120 seconds"
            ).into());
        }

        if self.tomtom.max_retries > 5 {
            return Err(TrafficPulseError::config(
                "TomTom API max retries cannot exceed 5"
            ).into());
        }

        if self.suggestions.debounce_ms > 5_000 {
            return Err(TrafficPulseError::config(
                "Suggestion debounce cannot exceed 5000 ms"
            ).into());
        }

        if self.suggestions.max_results > 100 {
            return Err(TrafficPulseError::config(
                "Suggestion max results cannot exceed 100"
            ).into());
        }

        if !(0.0..=22.0).contains(&self.map.default_zoom) {
            return Err(TrafficPulseError::config(
                "Map zoom must be between 0 and 22"
            ).into());
        }

        if self.dashboard.refresh_interval_seconds > 3_600 {
            return Err(TrafficPulseError::config(
                "Dashboard refresh interval cannot exceed 3600 seconds"
            ).into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TrafficPulseError::config(
                format!("Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_log_levels.join(", ")
                )
            ).into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TrafficPulseError::config(
                format!("Invalid log format '{}'. Must be one of: {}",
                    self.logging.format,
                    valid_log_formats.join(", ")
                )
            ).into());
        }

        if !self.tomtom.base_url.starts_with("http://") && !self.tomtom.base_url.starts_with("https://") {
            return Err(TrafficPulseError::config(
                "TomTom API base URL must be a valid HTTP or HTTPS URL"
            ).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = TrafficPulseConfig::default();
        assert_eq!(config.tomtom.base_url, "https://api.tomtom.com");
        assert_eq!(config.tomtom.timeout_seconds, 10);
        assert_eq!(config.tomtom.max_retries, 0);
        assert_eq!(config.suggestions.debounce(), Duration::from_millis(300));
        assert_eq!(config.suggestions.min_query_len, 3);
        assert_eq!(config.suggestions.max_results, 5);
        assert_eq!(config.map.traffic_refresh_seconds, 60);
        assert_eq!(config.dashboard.default_city, "delhi");
        assert_eq!(config.logging.level, "info");
        assert!(config.tomtom.api_key.is_none());
        assert!(!config.is_configured());
    }

    #[test]
    fn test_missing_api_key_is_valid() {
        let config = TrafficPulseConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_api_key_means_not_configured() {
        let mut config = TrafficPulseConfig::default();
        config.tomtom.api_key = Some("   ".to_string());
        config.apply_defaults();
        assert!(!config.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_api_key_is_rejected() {
        let mut config = TrafficPulseConfig::default();
        config.tomtom.api_key = Some("abc".to_string());
        let err = config.validate_api_keys().unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TrafficPulseConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TrafficPulseConfig::default();
        config.tomtom.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = TrafficPulseConfig::default();
        config.tomtom.base_url = "ftp://tomtom".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = TrafficPulseConfig::default();
        config.tomtom.timeout_seconds = 0;
        config.suggestions.max_results = 0;
        config.dashboard.default_city = String::new();
        config.apply_defaults();
        assert_eq!(config.tomtom.timeout_seconds, 10);
        assert_eq!(config.suggestions.max_results, 5);
        assert_eq!(config.dashboard.default_city, "delhi");
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[tomtom]\napi_key = \"file_key_12345\"\n\n[dashboard]\ndefault_city = \"mumbai\"\n",
        )
        .unwrap();

        let config = TrafficPulseConfig::load_from_path(Some(path)).unwrap();

        assert_eq!(config.tomtom.api_key.as_deref(), Some("file_key_12345"));
        assert_eq!(config.dashboard.default_city, "mumbai");
        assert_eq!(config.suggestions.debounce_ms, 300);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = TrafficPulseConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("trafficpulse"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
