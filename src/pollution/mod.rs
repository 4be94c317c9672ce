//! Air quality lookups

use async_trait::async_trait;

use crate::Result;
use crate::models::{Location, PollutionStats};

pub mod openweather;

/// Source of current air quality
#[async_trait]
pub trait PollutionProvider: Send + Sync {
    async fn fetch_pollution(&self, location: &Location) -> Result<PollutionStats>;
}

/// Label for an OpenWeather air quality index
#[must_use]
pub fn aqi_label(aqi: u8) -> &'static str {
    match aqi {
        1 => "Good",
        2 => "Fair",
        3 => "Moderate",
        4 => "Poor",
        5 => "Very Poor",
        _ => "Unknown",
    }
}
