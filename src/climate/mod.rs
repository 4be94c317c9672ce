//! Historical climate data
//!
//! Monthly climate norms from NASA POWER, multi-year aggregation and the
//! historical-versus-recent period comparison.

use async_trait::async_trait;

use crate::Result;
use crate::models::{HistoricalAverage, Location};

pub mod aggregator;
pub mod cached;
pub mod insight;
pub mod nasa_power;

pub use aggregator::{ConfidenceLevel, PeriodAggregate, YearRecord, aggregate_years};
pub use cached::CachedClimateProvider;
pub use insight::{ClimateComparison, PeriodSelection};
pub use nasa_power::NasaPowerClient;

/// Source of monthly historical averages
#[async_trait]
pub trait ClimateProvider: Send + Sync {
    /// Average for one month of one year; `Ok(None)` when the provider has no value
    async fn fetch_monthly(
        &self,
        location: &Location,
        year: i32,
        month: u32,
    ) -> Result<Option<HistoricalAverage>>;
}
