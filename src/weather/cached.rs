//! Caching decorators for forecast and geocoding providers

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{ForecastProvider, Geocoder};
use crate::Result;
use crate::cache::ResponseCache;
use crate::models::{ForecastPayload, Location};

/// Memoizes forecasts per rounded location
pub struct CachedForecastProvider {
    inner: Arc<dyn ForecastProvider>,
    cache: ResponseCache,
    ttl: Duration,
}

impl CachedForecastProvider {
    pub fn new(inner: Arc<dyn ForecastProvider>, cache: ResponseCache, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl ForecastProvider for CachedForecastProvider {
    async fn fetch_forecast(&self, location: &Location) -> Result<ForecastPayload> {
        let key = location.cache_key("forecast");
        self.cache
            .get_or_fetch(&key, self.ttl, || self.inner.fetch_forecast(location))
            .await
    }
}

/// Memoizes geocoding results per normalised query
pub struct CachedGeocoder {
    inner: Arc<dyn Geocoder>,
    cache: ResponseCache,
    ttl: Duration,
}

impl CachedGeocoder {
    pub fn new(inner: Arc<dyn Geocoder>, cache: ResponseCache, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl Geocoder for CachedGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<Location>> {
        let key = format!("geocode:{}", query.trim().to_lowercase());
        self.cache
            .get_or_fetch(&key, self.ttl, || self.inner.geocode(query))
            .await
    }
}
