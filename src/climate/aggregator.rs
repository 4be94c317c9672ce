//! Multi-year aggregation of monthly climate averages

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::ClimateProvider;
use crate::models::{Location, YearRange};

/// Values of one year that made it into a period aggregate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearRecord {
    pub year: i32,
    /// Rainfall in mm/day
    pub rainfall_mm: f64,
    /// Temperature in Celsius
    pub temp_c: f64,
}

/// Data quality label derived from a confidence ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceLevel {
    High,
    Moderate,
    Low,
    #[serde(rename = "n/a")]
    NotApplicable,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.8 {
            ConfidenceLevel::High
        } else if ratio >= 0.5 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Label for `found` out of `requested` years
    #[must_use]
    pub fn for_years(found: usize, requested: usize) -> Self {
        if requested == 0 {
            ConfidenceLevel::NotApplicable
        } else {
            Self::from_ratio(found as f64 / requested as f64)
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Moderate => "Moderate",
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::NotApplicable => "n/a",
        })
    }
}

/// Running mean that yields nothing until a value is added
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn result(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Means over the years of a range that returned data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAggregate {
    pub range: YearRange,
    /// Years with data in ascending order
    pub records: Vec<YearRecord>,
    pub mean_rainfall: Option<f64>,
    pub mean_temp: Option<f64>,
}

impl PeriodAggregate {
    fn from_records(range: YearRange, records: Vec<YearRecord>) -> Self {
        let mut rainfall = Mean::default();
        let mut temperature = Mean::default();
        for record in &records {
            rainfall.add(record.rainfall_mm);
            temperature.add(record.temp_c);
        }

        Self {
            range,
            mean_rainfall: rainfall.result(),
            mean_temp: temperature.result(),
            records,
        }
    }

    #[must_use]
    pub fn years_found(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn years_requested(&self) -> usize {
        self.range.len()
    }

    /// Fraction of requested years that returned data; 0 for an empty range
    #[must_use]
    pub fn confidence_ratio(&self) -> f64 {
        match self.years_requested() {
            0 => 0.0,
            requested => self.years_found() as f64 / requested as f64,
        }
    }

    #[must_use]
    pub fn confidence(&self) -> ConfidenceLevel {
        ConfidenceLevel::for_years(self.years_found(), self.years_requested())
    }

    /// True when no year produced data and no mean exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fetch one average per year in `[start, end]` and average them.
///
/// Years that fail or return nothing are skipped. Non-finite values drop the
/// whole year so both means cover the same years.
#[instrument(level = "debug", skip(provider, location), fields(location = %location.name))]
pub async fn aggregate_years(
    provider: &dyn ClimateProvider,
    location: &Location,
    month: u32,
    start: i32,
    end: i32,
) -> PeriodAggregate {
    let range = YearRange::new(start, end);
    let mut records = Vec::new();

    for year in range.years() {
        match provider.fetch_monthly(location, year, month).await {
            Ok(Some(average)) if average.avg_rainfall_mm.is_finite() && average.avg_temp_c.is_finite() => {
                records.push(YearRecord {
                    year,
                    rainfall_mm: average.avg_rainfall_mm,
                    temp_c: average.avg_temp_c,
                });
            }
            Ok(Some(_)) => debug!("Dropping non-finite climate values for {}", year),
            Ok(None) => debug!("No climate data for {}-{:02}", year, month),
            Err(e) => warn!("Skipping {} after climate provider error: {}", year, e),
        }
    }

    let aggregate = PeriodAggregate::from_records(range, records);
    debug!(
        "Aggregated {}/{} years for month {}",
        aggregate.years_found(),
        aggregate.years_requested(),
        month
    );
    aggregate
}
