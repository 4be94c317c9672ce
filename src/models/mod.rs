//! Data models for the Astrocast dashboard
//!
//! This module contains the core domain records organized by concern:
//! - Location: Geographic coordinates and metadata
//! - Forecast: Raw forecast points and per-day aggregates
//! - Climate: Monthly historical averages and year ranges
//! - Pollution: Air quality index and component concentrations

pub mod climate;
pub mod forecast;
pub mod location;
pub mod pollution;

// Re-export all public types for convenient access
pub use climate::{HistoricalAverage, YearRange};
pub use forecast::{DailyAggregate, DayPhase, ForecastPayload, RawForecastPoint};
pub use location::Location;
pub use pollution::{PollutantComponents, PollutionStats};
