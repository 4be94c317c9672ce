//! Dashboard orchestration
//!
//! Ties the location resolver, the data providers, the normalizer, the scorer
//! and the aggregator together into the views served by the HTTP API. Each
//! view degrades section by section and reports what went wrong as notices.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::assistant::{DisabledAssistant, OpenAiAssistant, TextAssistant};
use crate::cache::ResponseCache;
use crate::climate::{CachedClimateProvider, ClimateProvider, NasaPowerClient};
use crate::config::AstrocastConfig;
use crate::error::AstrocastError;
use crate::location_resolver::LocationResolver;
use crate::models::HistoricalAverage;
use crate::pollution::PollutionProvider;
use crate::suitability::ScoringConfig;
use crate::weather::{
    CachedForecastProvider, CachedGeocoder, ForecastProvider, Geocoder, OpenWeatherClient,
    normalize,
};

pub mod cards;
pub mod climate;
pub mod compare;
pub mod report;

pub use cards::{ForecastCard, TodayCard, condition_emoji};
pub use climate::ClimateInsight;
pub use compare::{ComparisonReport, ComparisonRow, WeekendDay, next_weekend_day};
pub use report::CityReport;

/// Earliest year with NASA POWER monthly coverage
pub const FIRST_CLIMATE_YEAR: i32 = 1981;

/// Latest year accepted in a climate period selection
pub const LAST_CLIMATE_YEAR: i32 = 2090;

/// External data sources used by the dashboard
#[derive(Clone)]
pub struct Providers {
    pub forecast: Arc<dyn ForecastProvider>,
    pub geocoder: Arc<dyn Geocoder>,
    pub climate: Arc<dyn ClimateProvider>,
    pub pollution: Arc<dyn PollutionProvider>,
    pub assistant: Arc<dyn TextAssistant>,
}

/// Question sent to the assistant from the chat panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatQuestion {
    pub question: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct DashboardService {
    providers: Providers,
    resolver: LocationResolver,
    scoring: Arc<ScoringConfig>,
}

impl DashboardService {
    pub fn new(providers: Providers, scoring: ScoringConfig) -> Self {
        let resolver = LocationResolver::new(Arc::clone(&providers.geocoder));
        Self {
            providers,
            resolver,
            scoring: Arc::new(scoring),
        }
    }

    /// Wire the production providers behind a shared response cache
    pub fn from_config(config: &AstrocastConfig) -> Result<Self> {
        let cache = ResponseCache::new(config.cache.max_entries);
        let openweather = Arc::new(OpenWeatherClient::new(&config.openweather)?);
        let nasa = Arc::new(NasaPowerClient::new(&config.nasa_power)?);

        let assistant: Arc<dyn TextAssistant> = match &config.ai.api_key {
            Some(key) => Arc::new(OpenAiAssistant::new(&config.ai, key.clone())?),
            None => {
                info!("AI assistant disabled (no API key configured)");
                Arc::new(DisabledAssistant)
            }
        };

        let providers = Providers {
            forecast: Arc::new(CachedForecastProvider::new(
                openweather.clone(),
                cache.clone(),
                config.cache.forecast_ttl(),
            )),
            geocoder: Arc::new(CachedGeocoder::new(
                openweather.clone(),
                cache.clone(),
                config.cache.geocode_ttl(),
            )),
            climate: Arc::new(CachedClimateProvider::new(
                nasa,
                cache,
                config.cache.climate_ttl(),
            )),
            pollution: openweather,
            assistant,
        };

        Ok(Self::new(providers, config.scoring.clone()))
    }

    #[must_use]
    pub fn assistant_configured(&self) -> bool {
        self.providers.assistant.is_configured()
    }

    /// Historical monthly average for one year of one city
    #[instrument(level = "info", skip(self))]
    pub async fn monthly_history(&self, city: &str, year: i32, month: u32) -> Result<HistoricalAverage> {
        validate_month(month)?;
        if year < FIRST_CLIMATE_YEAR {
            return Err(AstrocastError::validation(format!(
                "Year must be {FIRST_CLIMATE_YEAR} or later, got: {year}"
            )));
        }

        let location = self.resolver.resolve(city).await?;
        self.providers
            .climate
            .fetch_monthly(&location, year, month)
            .await?
            .ok_or_else(|| {
                AstrocastError::no_data(format!(
                    "No NASA POWER data for {} in {year}-{month:02}",
                    location.name
                ))
            })
    }

    /// Answer a chat question with whatever forecast context is available
    #[instrument(level = "info", skip(self, request))]
    pub async fn chat(&self, request: &ChatQuestion) -> Result<String> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(AstrocastError::validation("Question must not be empty"));
        }

        let context = self
            .build_chat_context(request.city.as_deref(), request.date)
            .await;
        debug!("Chat context: {}", context);
        self.providers.assistant.answer(question, &context).await
    }

    /// Context line for the assistant; lookups are best effort
    pub async fn build_chat_context(&self, city: Option<&str>, date: Option<NaiveDate>) -> String {
        let Some(city) = city.map(str::trim).filter(|c| !c.is_empty()) else {
            return String::new();
        };

        let mut parts = Vec::new();
        if let Some(date) = date {
            match self.forecast_metrics(city, date).await {
                Ok(Some(metrics)) => parts.push(metrics),
                Ok(None) => {}
                Err(e) => warn!("Chat context lookup failed for {}: {}", city, e),
            }
        }
        parts.push(format!("Current selected city: {city}"));
        parts.join(" | ")
    }

    async fn forecast_metrics(&self, city: &str, date: NaiveDate) -> Result<Option<String>> {
        let location = self.resolver.resolve(city).await?;
        let payload = self.providers.forecast.fetch_forecast(&location).await?;
        Ok(normalize(&payload.points, date).aggregate.map(|day| {
            format!(
                "Forecast target date metrics: temp {:.1}C, humidity {:.0}%, wind {:.1} m/s, rain {:.1} mm",
                day.avg_temp, day.avg_humidity, day.avg_wind, day.total_rain
            )
        }))
    }
}

pub(crate) fn validate_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(AstrocastError::validation(format!(
            "Month must be between 1 and 12, got: {month}"
        )))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::models::ForecastPayload;

    fn july_service() -> DashboardService {
        service(
            ForecastPayload::new(vec![
                point("2024-07-10 09:00:00", 20.0, 0.0, "Clear"),
                point("2024-07-10 12:00:00", 24.0, 0.0, "Clear"),
            ]),
            Arc::new(FakeClimate(Some(history(2.5, 21.0)))),
            Arc::new(EchoAssistant),
        )
    }

    #[tokio::test]
    async fn test_monthly_history_returns_average() {
        let average = july_service().monthly_history("Paris", 2020, 7).await.unwrap();
        assert_eq!(average.year, 2020);
        assert_eq!(average.avg_rainfall_mm, 2.5);
    }

    #[tokio::test]
    async fn test_monthly_history_validates_inputs() {
        let service = july_service();
        assert!(service.monthly_history("Paris", 2020, 13).await.unwrap_err().is_fatal());
        assert!(service.monthly_history("Paris", 1950, 7).await.unwrap_err().is_fatal());
        assert!(service.monthly_history("", 2020, 7).await.unwrap_err().is_fatal());
    }

    #[tokio::test]
    async fn test_monthly_history_without_data() {
        let service = service(
            ForecastPayload::missing(),
            Arc::new(FakeClimate(None)),
            Arc::new(DisabledAssistant),
        );
        let err = service.monthly_history("Paris", 2020, 7).await.unwrap_err();
        assert!(matches!(err, AstrocastError::NoDataInWindow { .. }));
    }

    #[tokio::test]
    async fn test_chat_context_joins_metrics_and_city() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 10).unwrap();
        let context = july_service().build_chat_context(Some("Paris"), Some(date)).await;
        assert_eq!(
            context,
            "Forecast target date metrics: temp 22.0C, humidity 50%, wind 3.0 m/s, rain 0.0 mm | Current selected city: Paris"
        );
    }

    #[tokio::test]
    async fn test_chat_context_without_date_names_city_only() {
        let context = july_service().build_chat_context(Some(" Paris "), None).await;
        assert_eq!(context, "Current selected city: Paris");
        assert_eq!(july_service().build_chat_context(None, None).await, "");
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_question() {
        let request = ChatQuestion {
            question: "  ".to_string(),
            city: None,
            date: None,
        };
        assert!(july_service().chat(&request).await.unwrap_err().is_fatal());
    }

    #[tokio::test]
    async fn test_chat_with_disabled_assistant() {
        let service = service(
            ForecastPayload::missing(),
            Arc::new(FakeClimate(None)),
            Arc::new(DisabledAssistant),
        );
        let request = ChatQuestion {
            question: "Rain tomorrow?".to_string(),
            city: Some("London".to_string()),
            date: None,
        };
        assert_eq!(
            service.chat(&request).await.unwrap(),
            crate::assistant::ANSWER_NOT_CONFIGURED
        );
    }
}
