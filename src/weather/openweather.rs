//! OpenWeather client for the 5-day / 3-hour forecast and direct geocoding

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::{ForecastProvider, Geocoder};
use crate::config::OpenWeatherConfig;
use crate::error::{AstrocastError, Provider};
use crate::models::{DayPhase, ForecastPayload, Location, RawForecastPoint};
use crate::Result;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// OpenWeather API client shared by forecast, geocoding and air pollution lookups
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenWeatherClient {
    /// Create a new client
    pub fn new(config: &OpenWeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent(concat!("Astrocast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AstrocastError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn api_key(&self, provider: Provider) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                AstrocastError::provider(provider, "API key missing (set OPENWEATHER_API_KEY)")
            })
    }

    /// GET a JSON document, mapping transport and status failures to provider errors
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        provider: Provider,
        path: &str,
        query: &str,
    ) -> Result<T> {
        let api_key = self.api_key(provider)?;
        let url = format!(
            "{}{}?{}&appid={}",
            self.base_url,
            path,
            query,
            urlencoding::encode(api_key)
        );

        debug!("Requesting {}{}", self.base_url, path);
        let started = Instant::now();

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AstrocastError::provider(provider, format!("request failed: {e}")))?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            started.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} request failed with {}: {}", provider, status, body);
            let message = match status.as_u16() {
                401 => "Invalid API key. Please check your OpenWeather API key.".to_string(),
                404 => "Location not found. Please check the city name.".to_string(),
                429 => "Rate limit exceeded.".to_string(),
                _ => format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
            };
            return Err(AstrocastError::provider(provider, message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AstrocastError::provider(provider, format!("invalid response: {e}")))
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherClient {
    #[instrument(level = "debug", skip(self, location), fields(location = %location.name))]
    async fn fetch_forecast(&self, location: &Location) -> Result<ForecastPayload> {
        let query = format!(
            "lat={}&lon={}&units=metric",
            location.latitude, location.longitude
        );
        let response: wire::ForecastResponse = self
            .get_json(Provider::Forecast, "/data/2.5/forecast", &query)
            .await?;

        let payload = response.into_payload();
        info!(
            "Fetched {} forecast points for {}",
            payload.points.len(),
            location.name
        );
        Ok(payload)
    }
}

#[async_trait]
impl Geocoder for OpenWeatherClient {
    #[instrument(level = "debug", skip(self))]
    async fn geocode(&self, query: &str) -> Result<Vec<Location>> {
        let query_string = format!("q={}&limit=1", urlencoding::encode(query));
        let results: Vec<wire::GeocodingResult> = self
            .get_json(Provider::Geocoding, "/geo/1.0/direct", &query_string)
            .await?;

        debug!("Geocoding '{}' returned {} results", query, results.len());
        Ok(results.into_iter().map(Location::from).collect())
    }
}

/// Parse one `list[]` entry, `None` when it is malformed
fn parse_entry(entry: serde_json::Value) -> Option<RawForecastPoint> {
    let entry: wire::ForecastEntry = match serde_json::from_value(entry) {
        Ok(entry) => entry,
        Err(e) => {
            debug!("Skipping malformed forecast entry: {}", e);
            return None;
        }
    };
    let timestamp = NaiveDateTime::parse_from_str(&entry.dt_txt, TIMESTAMP_FORMAT).ok()?;
    let condition = entry.weather.first();

    Some(RawForecastPoint {
        timestamp,
        temperature: entry.main.temp,
        humidity: entry.main.humidity,
        wind_speed: entry.wind.speed,
        precipitation: entry.rain.map_or(0.0, |rain| rain.three_hours),
        condition: condition
            .and_then(|c| c.main.clone())
            .unwrap_or_else(|| "Clear".to_string()),
        phase: DayPhase::from_icon(condition.and_then(|c| c.icon.as_deref())),
    })
}

/// OpenWeather response structures
mod wire {
    use serde::Deserialize;

    use super::parse_entry;
    use crate::models::{ForecastPayload, Location};

    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub list: Option<Vec<serde_json::Value>>,
    }

    impl ForecastResponse {
        pub fn into_payload(self) -> ForecastPayload {
            match self.list {
                Some(entries) => {
                    ForecastPayload::new(entries.into_iter().filter_map(parse_entry).collect())
                }
                None => ForecastPayload::missing(),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastEntry {
        pub dt_txt: String,
        pub main: MainBlock,
        pub wind: WindBlock,
        #[serde(default)]
        pub rain: Option<RainBlock>,
        #[serde(default)]
        pub weather: Vec<ConditionBlock>,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainBlock {
        pub temp: f64,
        pub humidity: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct WindBlock {
        pub speed: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct RainBlock {
        #[serde(rename = "3h", default)]
        pub three_hours: f64,
    }

    #[derive(Debug, Deserialize)]
    pub struct ConditionBlock {
        pub main: Option<String>,
        pub icon: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub name: String,
        pub lat: f64,
        pub lon: f64,
        pub country: Option<String>,
    }

    impl From<GeocodingResult> for Location {
        fn from(result: GeocodingResult) -> Self {
            Location {
                latitude: result.lat,
                longitude: result.lon,
                name: result.name,
                country: result.country,
            }
        }
    }
}
