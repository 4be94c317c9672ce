//! City report for a single date

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::DashboardService;
use super::cards::{ForecastCard, TodayCard};
use crate::Result;
use crate::assistant::SummaryMetrics;
use crate::error::{AstrocastError, Notice};
use crate::models::{DailyAggregate, ForecastPayload, HistoricalAverage, Location, PollutionStats};
use crate::suitability::{self, ForecastInputs, HistoricalInputs, SuitabilityResult};
use crate::weather::{daily_aggregates, normalize};

/// Number of calendar days shown in the overview
pub const OVERVIEW_DAYS: usize = 5;

const MISSING_SERIES: &str = "No forecast entries returned (possible API issue or invalid response).";
const EMPTY_WINDOW: &str = "No forecast data available in returned window.";

/// Everything the home page shows for one city and date
#[derive(Debug, Clone, Serialize)]
pub struct CityReport {
    pub city: String,
    pub location: Option<Location>,
    pub requested_date: NaiveDate,
    pub used_date: Option<NaiveDate>,
    pub substituted: bool,
    pub forecast: Option<DailyAggregate>,
    pub history: Option<HistoricalAverage>,
    pub rain_probability: Option<u8>,
    pub suitability: Option<SuitabilityResult>,
    pub suggestion: Option<String>,
    pub today: Option<TodayCard>,
    pub overview: Vec<ForecastCard>,
    pub pollution: Option<PollutionStats>,
    pub notices: Vec<Notice>,
}

impl CityReport {
    fn new(city: &str, requested_date: NaiveDate) -> Self {
        Self {
            city: city.trim().to_string(),
            location: None,
            requested_date,
            used_date: None,
            substituted: false,
            forecast: None,
            history: None,
            rain_probability: None,
            suitability: None,
            suggestion: None,
            today: None,
            overview: Vec::new(),
            pollution: None,
            notices: Vec::new(),
        }
    }

    fn notice(&mut self, err: &AstrocastError) {
        self.notices.push(Notice::from(err));
    }
}

impl DashboardService {
    /// Build the city report. Only invalid input fails the whole request.
    #[instrument(level = "info", skip(self))]
    pub async fn report(&self, city: &str, date: NaiveDate) -> Result<CityReport> {
        let mut report = CityReport::new(city, date);

        let location = match self.resolver.resolve(city).await {
            Ok(location) => location,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Could not resolve {}: {}", city, e);
                report.notice(&e);
                return Ok(report);
            }
        };

        let (forecast, pollution) = tokio::join!(
            self.providers.forecast.fetch_forecast(&location),
            self.providers.pollution.fetch_pollution(&location),
        );

        match forecast {
            Ok(payload) => self.apply_forecast(&mut report, &location, &payload).await,
            Err(e) => report.notice(&e),
        }

        match pollution {
            Ok(stats) => report.pollution = Some(stats),
            Err(e) => report.notice(&e),
        }

        info!(
            "Report for {} on {}: score {:?}, {} notices",
            location.name,
            date,
            report.suitability.as_ref().map(|s| s.score),
            report.notices.len()
        );
        report.location = Some(location);
        Ok(report)
    }

    async fn apply_forecast(&self, report: &mut CityReport, location: &Location, payload: &ForecastPayload) {
        report.overview = daily_aggregates(&payload.points)
            .iter()
            .take(OVERVIEW_DAYS)
            .map(ForecastCard::from)
            .collect();

        let normalized = normalize(&payload.points, report.requested_date);
        let Some(day) = normalized.aggregate else {
            if payload.series_present {
                report.notices.push(Notice::warning(EMPTY_WINDOW));
            } else {
                report.notices.push(Notice::error(MISSING_SERIES));
            }
            return;
        };

        report.used_date = Some(normalized.used_date);
        report.substituted = normalized.substituted;
        if normalized.substituted {
            report.notices.push(Notice::info(format!(
                "Selected date has no forecast points. Showing closest available forecast for {} instead.",
                normalized.used_date
            )));
        }

        let used = normalized.used_date;
        match self
            .providers
            .climate
            .fetch_monthly(location, used.year(), used.month())
            .await
        {
            Ok(history) => report.history = history,
            Err(e) => report.notice(&e),
        }

        let rain_probability = suitability::rain_probability(day.total_rain);
        report.rain_probability = Some(rain_probability);

        match &report.history {
            Some(history) => {
                let inputs = ForecastInputs {
                    rain_probability: f64::from(rain_probability),
                    temperature: day.avg_temp,
                    humidity: day.avg_humidity,
                    wind_speed: day.avg_wind,
                };
                let historical = HistoricalInputs {
                    avg_rainfall_mm: history.avg_rainfall_mm,
                    avg_temp_c: history.avg_temp_c,
                };
                report.suitability = Some(suitability::score(&inputs, &historical, &self.scoring));
                report.suggestion = Some(suitability::suggest(&inputs, &self.scoring).to_string());
            }
            None => report.notice(&AstrocastError::skipped(
                "Suitability score skipped: no historical climate data for this month.",
            )),
        }

        // Summarized for every selected day, with or without history
        let metrics = SummaryMetrics {
            temp: day.avg_temp,
            humidity: day.avg_humidity,
            wind: day.avg_wind,
            rain: day.total_rain,
        };
        let summary = match self.providers.assistant.summarize(&metrics).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                report
                    .notices
                    .push(Notice::warning(format!("AI summary failed: {}", e.user_message())));
                None
            }
        };

        let score = report.suitability.as_ref().map(|s| s.score);
        report.today = Some(TodayCard::new(&day, score, summary));
        report.forecast = Some(day);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::testing::*;
    use super::*;
    use crate::assistant::{DisabledAssistant, SUMMARY_NOT_CONFIGURED};
    use crate::error::NoticeLevel;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn week() -> ForecastPayload {
        ForecastPayload::new(vec![
            point("2024-07-10 09:00:00", 20.0, 0.0, "Clear"),
            point("2024-07-10 12:00:00", 24.0, 0.0, "Clear"),
            point("2024-07-11 12:00:00", 18.0, 6.0, "Rain"),
            point("2024-07-12 12:00:00", 19.0, 0.0, "Clouds"),
            point("2024-07-13 12:00:00", 23.0, 0.0, "Clear"),
            point("2024-07-14 12:00:00", 25.0, 0.0, "Clear"),
            point("2024-07-15 12:00:00", 26.0, 0.0, "Clear"),
        ])
    }

    #[tokio::test]
    async fn test_full_report() {
        let service = service(
            week(),
            Arc::new(FakeClimate(Some(history(2.5, 21.0)))),
            Arc::new(EchoAssistant),
        );

        let report = service.report("Paris", date("2024-07-10")).await.unwrap();

        assert_eq!(report.used_date, Some(date("2024-07-10")));
        assert!(!report.substituted);
        assert_eq!(report.rain_probability, Some(0));
        assert!(report.suitability.is_some());
        assert_eq!(report.suggestion.as_deref(), Some("Great for outdoor parade"));
        assert_eq!(report.overview.len(), OVERVIEW_DAYS);
        assert_eq!(report.overview[0].date, date("2024-07-10"));
        assert_eq!(report.pollution.as_ref().map(|p| p.aqi), Some(2));

        let today = report.today.unwrap();
        assert_eq!(today.summary.as_deref(), Some("Around 22C."));
        assert!(today.metrics.iter().any(|m| m.starts_with("🎯 Score")));
        assert!(report.notices.is_empty());
    }

    #[tokio::test]
    async fn test_report_substitutes_nearest_day() {
        let service = service(
            week(),
            Arc::new(FakeClimate(Some(history(2.5, 21.0)))),
            Arc::new(DisabledAssistant),
        );

        let report = service.report("Paris", date("2024-07-20")).await.unwrap();

        assert_eq!(report.used_date, Some(date("2024-07-15")));
        assert!(report.substituted);
        assert_eq!(report.notices[0].level, NoticeLevel::Info);
        assert_eq!(
            report.notices[0].message,
            "Selected date has no forecast points. Showing closest available forecast for 2024-07-15 instead."
        );
        assert_eq!(
            report.today.and_then(|t| t.summary).as_deref(),
            Some(SUMMARY_NOT_CONFIGURED)
        );
    }

    #[tokio::test]
    async fn test_missing_history_skips_score_only() {
        let service = service(
            week(),
            Arc::new(FakeClimate(None)),
            Arc::new(DisabledAssistant),
        );

        let report = service.report("Paris", date("2024-07-11")).await.unwrap();

        assert!(report.suitability.is_none());
        assert_eq!(report.rain_probability, Some(90));
        let today = report.today.as_ref().unwrap();
        assert_eq!(
            today.summary.as_deref(),
            Some(SUMMARY_NOT_CONFIGURED)
        );
        assert_eq!(report.notices.len(), 1);
        assert_eq!(report.notices[0].level, NoticeLevel::Info);
    }

    #[tokio::test]
    async fn test_climate_failure_is_reported() {
        let service = service(week(), Arc::new(DownClimate), Arc::new(DisabledAssistant));

        let report = service.report("Paris", date("2024-07-10")).await.unwrap();

        assert!(report.suitability.is_none());
        assert_eq!(report.notices[0].level, NoticeLevel::Error);
        assert_eq!(report.notices[0].message, "NASA POWER error: HTTP 503");
    }

    #[tokio::test]
    async fn test_missing_series_and_empty_window() {
        let missing = service(
            ForecastPayload::missing(),
            Arc::new(FakeClimate(None)),
            Arc::new(DisabledAssistant),
        );
        let report = missing.report("Paris", date("2024-07-10")).await.unwrap();
        assert_eq!(report.notices[0], Notice::error(MISSING_SERIES));
        assert!(report.pollution.is_some());

        let empty = service(
            ForecastPayload::new(Vec::new()),
            Arc::new(FakeClimate(None)),
            Arc::new(DisabledAssistant),
        );
        let report = empty.report("Paris", date("2024-07-10")).await.unwrap();
        assert_eq!(report.notices[0], Notice::warning(EMPTY_WINDOW));
        assert!(report.today.is_none());
    }

    #[tokio::test]
    async fn test_unknown_city_degrades_and_empty_city_fails() {
        let service = service(week(), Arc::new(FakeClimate(None)), Arc::new(DisabledAssistant));

        let report = service.report("Nowhere", date("2024-07-10")).await.unwrap();
        assert!(report.location.is_none());
        assert_eq!(report.notices[0].message, "Geocoding error: Location not found: Nowhere");

        let err = service.report("  ", date("2024-07-10")).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
