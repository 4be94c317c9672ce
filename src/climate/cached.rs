use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::ClimateProvider;
use crate::Result;
use crate::cache::ResponseCache;
use crate::models::{HistoricalAverage, Location};

/// Memoizes monthly averages per (location, year, month)
pub struct CachedClimateProvider {
    inner: Arc<dyn ClimateProvider>,
    cache: ResponseCache,
    ttl: Duration,
}

impl CachedClimateProvider {
    pub fn new(inner: Arc<dyn ClimateProvider>, cache: ResponseCache, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl ClimateProvider for CachedClimateProvider {
    async fn fetch_monthly(
        &self,
        location: &Location,
        year: i32,
        month: u32,
    ) -> Result<Option<HistoricalAverage>> {
        let key = format!("{}:{year}:{month:02}", location.cache_key("climate"));
        self.cache
            .get_or_fetch(&key, self.ttl, || {
                self.inner.fetch_monthly(location, year, month)
            })
            .await
    }
}
