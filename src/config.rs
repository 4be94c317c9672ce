//! Configuration management for the Astrocast dashboard
//!
//! Handles loading configuration from a TOML file and environment variables,
//! and provides validation for all configuration settings.

use crate::AstrocastError;
use crate::suitability::ScoringConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "astrocast.toml";

/// Root configuration structure for the Astrocast application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AstrocastConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// OpenWeather forecast, geocoding and pollution API
    #[serde(default)]
    pub openweather: OpenWeatherConfig,
    /// NASA POWER climate API
    #[serde(default)]
    pub nasa_power: NasaPowerConfig,
    /// Optional AI assistant
    #[serde(default)]
    pub ai: AiConfig,
    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Suitability scoring table
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the static frontend
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// OpenWeather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeatherConfig {
    /// OpenWeather API key
    pub api_key: Option<String>,
    /// Base URL for the OpenWeather API
    #[serde(default = "default_openweather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// NASA POWER API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NasaPowerConfig {
    #[serde(default = "default_nasa_base_url")]
    pub base_url: String,
    /// User community, which selects the unit set
    #[serde(default = "default_nasa_community")]
    pub community: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// AI assistant configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API key; the assistant is disabled without one
    pub api_key: Option<String>,
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_ai_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_ai_temperature")]
    pub temperature: f32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Forecast TTL in minutes
    #[serde(default = "default_forecast_ttl")]
    pub forecast_ttl_minutes: u32,
    /// Climate lookup TTL in minutes
    #[serde(default = "default_climate_ttl")]
    pub climate_ttl_minutes: u32,
    /// Geocoding TTL in hours
    #[serde(default = "default_geocode_ttl")]
    pub geocode_ttl_hours: u32,
    /// Maximum number of cached responses
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,
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
    /// OTLP HTTP endpoint; traces are exported only when set
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "frontend".to_string()
}

fn default_openweather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_timeout() -> u32 {
    15
}

fn default_nasa_base_url() -> String {
    "https://power.larc.nasa.gov/api".to_string()
}

fn default_nasa_community() -> String {
    "AG".to_string()
}

fn default_ai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ai_max_tokens() -> u32 {
    300
}

fn default_ai_temperature() -> f32 {
    0.4
}

fn default_forecast_ttl() -> u32 {
    30
}

fn default_climate_ttl() -> u32 {
    60
}

fn default_geocode_ttl() -> u32 {
    24
}

fn default_cache_max_entries() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openweather_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for NasaPowerConfig {
    fn default() -> Self {
        Self {
            base_url: default_nasa_base_url(),
            community: default_nasa_community(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_ai_base_url(),
            model: default_ai_model(),
            timeout_seconds: default_timeout(),
            max_tokens: default_ai_max_tokens(),
            temperature: default_ai_temperature(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            forecast_ttl_minutes: default_forecast_ttl(),
            climate_ttl_minutes: default_climate_ttl(),
            geocode_ttl_hours: default_geocode_ttl(),
            max_entries: default_cache_max_entries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn forecast_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.forecast_ttl_minutes) * 60)
    }

    #[must_use]
    pub fn climate_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.climate_ttl_minutes) * 60)
    }

    #[must_use]
    pub fn geocode_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.geocode_ttl_hours) * 3600)
    }
}

impl AstrocastConfig {
    /// Load configuration from the default file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides, e.g. ASTROCAST_OPENWEATHER__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("ASTROCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AstrocastConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize configuration from {}", config_file.display()))?;

        config.apply_env_fallbacks();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Pick up the conventional provider key variables when no key is configured
    pub fn apply_env_fallbacks(&mut self) {
        if self.openweather.api_key.is_none() {
            self.openweather.api_key = std::env::var("OPENWEATHER_API_KEY").ok();
        }
        if self.ai.api_key.is_none() {
            self.ai.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.openweather.base_url.is_empty() {
            self.openweather.base_url = default_openweather_base_url();
        }
        if self.openweather.timeout_seconds == 0 {
            self.openweather.timeout_seconds = default_timeout();
        }
        if self.nasa_power.base_url.is_empty() {
            self.nasa_power.base_url = default_nasa_base_url();
        }
        if self.nasa_power.community.is_empty() {
            self.nasa_power.community = default_nasa_community();
        }
        if self.nasa_power.timeout_seconds == 0 {
            self.nasa_power.timeout_seconds = default_timeout();
        }
        if self.ai.base_url.is_empty() {
            self.ai.base_url = default_ai_base_url();
        }
        if self.ai.model.is_empty() {
            self.ai.model = default_ai_model();
        }
        if self.ai.timeout_seconds == 0 {
            self.ai.timeout_seconds = default_timeout();
        }
        if self.ai.max_tokens == 0 {
            self.ai.max_tokens = default_ai_max_tokens();
        }
        if self.cache.max_entries == 0 {
            self.cache.max_entries = default_cache_max_entries();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        // Blank keys mean "not configured"
        if self.openweather.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.openweather.api_key = None;
        }
        if self.ai.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.ai.api_key = None;
        }
        if self.logging.otlp_endpoint.as_deref().is_some_and(str::is_empty) {
            self.logging.otlp_endpoint = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.scoring
            .validate()
            .map_err(AstrocastError::config)?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        let keys = [
            ("OpenWeather", self.openweather.api_key.as_deref()),
            ("OpenAI", self.ai.api_key.as_deref()),
        ];

        for (name, key) in keys {
            let Some(key) = key else { continue };

            if key.len() < 8 {
                return Err(AstrocastError::config(format!(
                    "{name} API key appears to be invalid (too short). Please check your API key."
                ))
                .into());
            }

            if key.len() > 200 {
                return Err(AstrocastError::config(format!(
                    "{name} API key appears to be invalid (too long). Please check your API key."
                ))
                .into());
            }

            if key.chars().any(char::is_whitespace) {
                return Err(AstrocastError::config(format!(
                    "{name} API key must not contain whitespace"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            ("OpenWeather", self.openweather.timeout_seconds),
            ("NASA POWER", self.nasa_power.timeout_seconds),
            ("AI", self.ai.timeout_seconds),
        ];
        for (name, timeout) in timeouts {
            if timeout > 300 {
                return Err(AstrocastError::config(format!(
                    "{name} timeout cannot exceed 300 seconds"
                ))
                .into());
            }
        }

        if self.server.port == 0 {
            return Err(AstrocastError::config("Server port must be non-zero").into());
        }

        if self.ai.max_tokens > 4096 {
            return Err(AstrocastError::config("AI max tokens cannot exceed 4096").into());
        }

        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(AstrocastError::config("AI temperature must be between 0 and 2").into());
        }

        if self.cache.forecast_ttl_minutes > 24 * 60 {
            return Err(AstrocastError::config("Forecast cache TTL cannot exceed 1440 minutes (1 day)").into());
        }

        if self.cache.climate_ttl_minutes > 7 * 24 * 60 {
            return Err(AstrocastError::config("Climate cache TTL cannot exceed 10080 minutes (1 week)").into());
        }

        if self.cache.geocode_ttl_hours > 168 {
            return Err(AstrocastError::config("Geocoding cache TTL cannot exceed 168 hours (1 week)").into());
        }

        if self.cache.max_entries > 1_000_000 {
            return Err(AstrocastError::config("Cache max entries cannot exceed 1000000").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AstrocastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AstrocastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("OpenWeather base URL", Some(self.openweather.base_url.as_str())),
            ("NASA POWER base URL", Some(self.nasa_power.base_url.as_str())),
            ("AI base URL", Some(self.ai.base_url.as_str())),
            ("OTLP endpoint", self.logging.otlp_endpoint.as_deref()),
        ];
        for (name, url) in urls {
            let Some(url) = url else { continue };
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AstrocastError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
