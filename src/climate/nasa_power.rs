//! NASA POWER monthly point API client

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::ClimateProvider;
use crate::config::NasaPowerConfig;
use crate::error::{AstrocastError, Provider};
use crate::models::{HistoricalAverage, Location};
use crate::Result;

/// Value NASA POWER uses for missing data
const FILL_VALUE: f64 = -999.0;
const RAINFALL_PARAMETER: &str = "PRECTOTCORR";
const TEMPERATURE_PARAMETER: &str = "T2M";

pub struct NasaPowerClient {
    client: Client,
    base_url: String,
    community: String,
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: HashMap<String, HashMap<String, f64>>,
}

impl PowerResponse {
    fn value(&self, parameter: &str, key: &str) -> Option<f64> {
        self.properties
            .parameter
            .get(parameter)
            .and_then(|series| series.get(key))
            .copied()
            .filter(|v| v.is_finite() && (*v - FILL_VALUE).abs() > f64::EPSILON)
    }
}

impl NasaPowerClient {
    pub fn new(config: &NasaPowerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent(concat!("Astrocast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AstrocastError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            community: config.community.clone(),
        })
    }
}

#[async_trait]
impl ClimateProvider for NasaPowerClient {
    #[instrument(level = "debug", skip(self, location), fields(location = %location.name))]
    async fn fetch_monthly(
        &self,
        location: &Location,
        year: i32,
        month: u32,
    ) -> Result<Option<HistoricalAverage>> {
        let url = format!(
            "{}/temporal/monthly/point?parameters={RAINFALL_PARAMETER},{TEMPERATURE_PARAMETER}&community={}&longitude={}&latitude={}&start={year}&end={year}&format=JSON",
            self.base_url,
            urlencoding::encode(&self.community),
            location.longitude,
            location.latitude,
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AstrocastError::provider(Provider::Climate, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("NASA POWER request failed with {}: {}", status, body);
            return Err(AstrocastError::provider(
                Provider::Climate,
                format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
            ));
        }

        let power: PowerResponse = response.json().await.map_err(|e| {
            AstrocastError::provider(Provider::Climate, format!("invalid response: {e}"))
        })?;

        let key = format!("{year}{month:02}");
        let rainfall = power.value(RAINFALL_PARAMETER, &key);
        let temperature = power.value(TEMPERATURE_PARAMETER, &key);

        match (rainfall, temperature) {
            (Some(avg_rainfall_mm), Some(avg_temp_c)) => {
                info!(
                    "NASA POWER {}: {:.2} mm/day, {:.1} °C",
                    key, avg_rainfall_mm, avg_temp_c
                );
                Ok(Some(HistoricalAverage {
                    year,
                    month,
                    avg_rainfall_mm,
                    avg_temp_c,
                }))
            }
            _ => {
                debug!("NASA POWER has no complete value for {}", key);
                Ok(None)
            }
        }
    }
}
