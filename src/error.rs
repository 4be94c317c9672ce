//! Error types and user-facing notices for the Astrocast dashboard

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// External data source an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Forecast,
    Geocoding,
    Climate,
    Pollution,
    Assistant,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Forecast => "Weather API",
            Provider::Geocoding => "Geocoding",
            Provider::Climate => "NASA POWER",
            Provider::Pollution => "Pollution API",
            Provider::Assistant => "AI",
        };
        f.write_str(name)
    }
}

/// Main error type for the Astrocast application
#[derive(Error, Debug)]
pub enum AstrocastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Network or API failure from an external provider
    #[error("{provider} error: {message}")]
    ProviderUnavailable { provider: Provider, message: String },

    /// Provider answered but the requested window holds no usable data
    #[error("{message}")]
    NoDataInWindow { message: String },

    /// A computation was omitted because its upstream data is missing
    #[error("{message}")]
    ComputationSkipped { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AstrocastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new provider error
    pub fn provider<S: Into<String>>(provider: Provider, message: S) -> Self {
        Self::ProviderUnavailable {
            provider,
            message: message.into(),
        }
    }

    /// Create a new no-data error
    pub fn no_data<S: Into<String>>(message: S) -> Self {
        Self::NoDataInWindow {
            message: message.into(),
        }
    }

    /// Create a new skipped-computation error
    pub fn skipped<S: Into<String>>(message: S) -> Self {
        Self::ComputationSkipped {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Whether the error should abort the request rather than degrade a section
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Validation { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AstrocastError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            AstrocastError::Validation { message } => format!("Invalid input: {message}"),
            AstrocastError::ProviderUnavailable { provider, message } => {
                format!("{provider} error: {message}")
            }
            AstrocastError::NoDataInWindow { message }
            | AstrocastError::ComputationSkipped { message } => message.clone(),
            AstrocastError::Cache { .. } => {
                "Cache operation failed. Results were fetched without caching.".to_string()
            }
            AstrocastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

/// Severity of a notice shown next to a dashboard section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Error,
    Warning,
    Info,
}

/// Non-fatal, user-visible message attached to a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning<S: Into<String>>(message: S) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn info<S: Into<String>>(message: S) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

impl From<&AstrocastError> for Notice {
    fn from(err: &AstrocastError) -> Self {
        let level = match err {
            AstrocastError::NoDataInWindow { .. } => NoticeLevel::Warning,
            AstrocastError::ComputationSkipped { .. } => NoticeLevel::Info,
            _ => NoticeLevel::Error,
        };
        Self {
            level,
            message: err.user_message(),
        }
    }
}
