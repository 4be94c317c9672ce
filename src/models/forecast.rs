//! Forecast records: raw sub-day points and their per-day aggregate

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Whether a forecast point falls in daylight or at night
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPhase {
    Day,
    Night,
}

impl DayPhase {
    /// Derive the phase from an OpenWeather icon code such as `10d` or `01n`
    #[must_use]
    pub fn from_icon(icon: Option<&str>) -> Self {
        match icon {
            Some(code) if !code.is_empty() && !code.ends_with('d') => DayPhase::Night,
            _ => DayPhase::Day,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DayPhase::Day => "day",
            DayPhase::Night => "night",
        }
    }
}

/// A single forecast reading as returned by the forecast provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecastPoint {
    /// Local timestamp of the reading
    pub timestamp: NaiveDateTime,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Precipitation accumulated over the reporting interval in mm
    pub precipitation: f64,
    /// Main condition label (Clear, Clouds, Rain, ...)
    pub condition: String,
    pub phase: DayPhase,
}

impl RawForecastPoint {
    /// Calendar date this point belongs to
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Points returned by one forecast fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    /// Whether the provider response carried a forecast series at all
    pub series_present: bool,
    /// Usable points in arrival order
    pub points: Vec<RawForecastPoint>,
}

impl ForecastPayload {
    #[must_use]
    pub fn new(points: Vec<RawForecastPoint>) -> Self {
        Self {
            series_present: true,
            points,
        }
    }

    /// A response without any forecast series
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Per-calendar-day summary of the points sharing that date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    /// Mean temperature in Celsius
    pub avg_temp: f64,
    /// Mean relative humidity in percent
    pub avg_humidity: f64,
    /// Mean wind speed in m/s
    pub avg_wind: f64,
    /// Summed precipitation in mm
    pub total_rain: f64,
    /// Dominant condition of the day
    pub condition: String,
    /// Phase paired with the dominant condition
    pub phase: DayPhase,
    /// Number of points averaged into this aggregate
    pub point_count: usize,
}
