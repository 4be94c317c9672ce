//! Forecast retrieval and normalization
//!
//! Provider traits for forecasts and geocoding, the OpenWeather client that
//! implements them, a caching decorator and the forecast normalizer.

use async_trait::async_trait;

use crate::Result;
use crate::models::{ForecastPayload, Location};

pub mod cached;
pub mod normalizer;
pub mod openweather;

pub use cached::{CachedForecastProvider, CachedGeocoder};
pub use normalizer::{NormalizedForecast, daily_aggregates, normalize};
pub use openweather::OpenWeatherClient;

/// Source of multi-point forecasts
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch the provider's whole forecast window for a location
    async fn fetch_forecast(&self, location: &Location) -> Result<ForecastPayload>;
}

/// Resolves free-text place names into coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidate locations for a query, best match first
    async fn geocode(&self, query: &str) -> Result<Vec<Location>>;
}
