//! `Astrocast` - Weather and climate dashboard for outdoor event planning
//!
//! This library normalizes multi-point forecasts into daily aggregates,
//! scores event suitability against historical climate norms and compares
//! multi-year climate periods.

pub mod api;
pub mod assistant;
pub mod cache;
pub mod climate;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod location_resolver;
pub mod models;
pub mod pollution;
pub mod suitability;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use cache::ResponseCache;
pub use config::AstrocastConfig;
pub use dashboard::DashboardService;
pub use error::{AstrocastError, Notice, NoticeLevel, Provider};
pub use location_resolver::{LocationInput, LocationParser, LocationResolver};
pub use models::{DailyAggregate, HistoricalAverage, Location, RawForecastPoint};
pub use suitability::{ForecastInputs, HistoricalInputs, ScoringConfig, SuitabilityResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AstrocastError>;
