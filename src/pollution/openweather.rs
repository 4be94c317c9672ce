//! OpenWeather air pollution endpoint

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{PollutionProvider, aqi_label};
use crate::Result;
use crate::error::{AstrocastError, Provider};
use crate::models::{Location, PollutantComponents, PollutionStats};
use crate::weather::OpenWeatherClient;

#[derive(Debug, Deserialize)]
struct AirPollutionResponse {
    #[serde(default)]
    list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
struct AirPollutionEntry {
    main: AirQuality,
    #[serde(default)]
    components: PollutantComponents,
}

#[derive(Debug, Deserialize)]
struct AirQuality {
    aqi: u8,
}

#[async_trait]
impl PollutionProvider for OpenWeatherClient {
    #[instrument(level = "debug", skip(self, location), fields(location = %location.name))]
    async fn fetch_pollution(&self, location: &Location) -> Result<PollutionStats> {
        let query = format!("lat={}&lon={}", location.latitude, location.longitude);
        let response: AirPollutionResponse = self
            .get_json(Provider::Pollution, "/data/2.5/air_pollution", &query)
            .await?;

        let entry = response
            .list
            .into_iter()
            .next()
            .ok_or_else(|| AstrocastError::provider(Provider::Pollution, "no air quality data returned"))?;

        info!("Air quality index {} for {}", entry.main.aqi, location.name);
        Ok(PollutionStats {
            aqi: entry.main.aqi,
            label: aqi_label(entry.main.aqi).to_string(),
            components: entry.components,
        })
    }
}
