//! Configuration management for `airq`
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::AirQualityError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fallback environment variable for the upstream credential
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Root configuration structure for `airq`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirqConfig {
    /// Upstream API configuration
    #[serde(default)]
    pub openweather: OpenWeatherConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Upstream API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    /// API key sent as `appid` on every request
    pub api_key: Option<String>,
    /// Base URL shared by the geocoding and air pollution endpoints
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
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
        }
    }
}

impl AirqConfig {
    /// Load configuration from the default file location and environment variables
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

        // AIRQ_OPENWEATHER__API_KEY, AIRQ_LOGGING__LEVEL, ...
        // Values stay strings; numeric fields are converted on deserialize,
        // and the credential keeps any leading zeros.
        builder = builder.add_source(
            Environment::with_prefix("AIRQ")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(false),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AirqConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.openweather.api_key.is_none() {
            config.openweather.api_key = std::env::var(API_KEY_ENV).ok();
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("airq").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.openweather.base_url.is_empty() {
            self.openweather.base_url = default_base_url();
        }
        if self.openweather.timeout_seconds == 0 {
            self.openweather.timeout_seconds = default_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all settings except the API key, which is only required
    /// once a live client is built
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// The configured API key, or a configuration error
    pub fn require_api_key(&self) -> crate::Result<&str> {
        let Some(api_key) = self.openweather.api_key.as_deref() else {
            return Err(AirQualityError::config(format!(
                "No API key configured. Set {API_KEY_ENV} or openweather.api_key in the config file."
            )));
        };

        if api_key.trim().is_empty() {
            return Err(AirQualityError::config("API key cannot be empty"));
        }

        if api_key.chars().any(char::is_whitespace) {
            return Err(AirQualityError::config(
                "API key appears to be invalid (contains whitespace). Please check your API key.",
            ));
        }

        Ok(api_key)
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.openweather.timeout_seconds > 120 {
            return Err(AirQualityError::config("Upstream timeout cannot exceed 120 seconds").into());
        }

        if self.server.port == 0 {
            return Err(AirQualityError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AirQualityError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AirQualityError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.openweather.base_url.starts_with("http://")
            && !self.openweather.base_url.starts_with("https://")
        {
            return Err(AirQualityError::config(
                "OpenWeather base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}
