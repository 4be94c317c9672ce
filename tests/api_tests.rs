//! End-to-end tests of the JSON API over in-memory providers

use std::sync::Arc;

use astrocast::api::{self, AppState};
use astrocast::assistant::{SummaryMetrics, TextAssistant};
use astrocast::climate::ClimateProvider;
use astrocast::dashboard::Providers;
use astrocast::models::{
    DayPhase, ForecastPayload, HistoricalAverage, Location, PollutantComponents, PollutionStats,
    RawForecastPoint,
};
use astrocast::pollution::PollutionProvider;
use astrocast::weather::{ForecastProvider, Geocoder};
use astrocast::{AstrocastError, DashboardService, Provider, Result, ScoringConfig};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::NaiveDateTime;
use serde_json::Value;
use tower::ServiceExt;

// =============================================================================
// In-memory providers
// =============================================================================

struct FixedForecast;

fn point(timestamp: &str, temperature: f64, rain: f64, condition: &str) -> RawForecastPoint {
    RawForecastPoint {
        timestamp: NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").unwrap(),
        temperature,
        humidity: 50.0,
        wind_speed: 3.0,
        precipitation: rain,
        condition: condition.to_string(),
        phase: DayPhase::Day,
    }
}

#[async_trait]
impl ForecastProvider for FixedForecast {
    async fn fetch_forecast(&self, _location: &Location) -> Result<ForecastPayload> {
        Ok(ForecastPayload::new(vec![
            point("2024-07-10 09:00:00", 20.0, 0.0, "Clear"),
            point("2024-07-10 15:00:00", 24.0, 0.0, "Clear"),
            point("2024-07-13 12:00:00", 22.0, 0.0, "Clear"),
        ]))
    }
}

struct KnownCities;

#[async_trait]
impl Geocoder for KnownCities {
    async fn geocode(&self, query: &str) -> Result<Vec<Location>> {
        if query.eq_ignore_ascii_case("nowhere") {
            return Ok(Vec::new());
        }
        Ok(vec![Location::with_country(
            48.8566,
            2.3522,
            query.to_string(),
            "FR".to_string(),
        )])
    }
}

/// Rainier months from 2015 on; no data before 1990
struct TrendClimate;

#[async_trait]
impl ClimateProvider for TrendClimate {
    async fn fetch_monthly(
        &self,
        _location: &Location,
        year: i32,
        month: u32,
    ) -> Result<Option<HistoricalAverage>> {
        if year < 1990 {
            return Ok(None);
        }
        let avg_rainfall_mm = if year >= 2015 { 3.0 } else { 2.0 };
        Ok(Some(HistoricalAverage {
            year,
            month,
            avg_rainfall_mm,
            avg_temp_c: 18.0,
        }))
    }
}

struct DownClimate;

#[async_trait]
impl ClimateProvider for DownClimate {
    async fn fetch_monthly(
        &self,
        _location: &Location,
        _year: i32,
        _month: u32,
    ) -> Result<Option<HistoricalAverage>> {
        Err(AstrocastError::provider(Provider::Climate, "HTTP 503"))
    }
}

struct FairAir;

#[async_trait]
impl PollutionProvider for FairAir {
    async fn fetch_pollution(&self, _location: &Location) -> Result<PollutionStats> {
        Ok(PollutionStats {
            aqi: 2,
            label: "Fair".to_string(),
            components: PollutantComponents::default(),
        })
    }
}

struct EchoAssistant;

#[async_trait]
impl TextAssistant for EchoAssistant {
    fn is_configured(&self) -> bool {
        true
    }

    async fn summarize(&self, metrics: &SummaryMetrics) -> Result<String> {
        Ok(format!("Around {:.0}C.", metrics.temp))
    }

    async fn answer(&self, question: &str, context: &str) -> Result<String> {
        Ok(format!("{question} [{context}]"))
    }
}

fn app_with(climate: Arc<dyn ClimateProvider>) -> Router {
    let providers = Providers {
        forecast: Arc::new(FixedForecast),
        geocoder: Arc::new(KnownCities),
        climate,
        pollution: Arc::new(FairAir),
        assistant: Arc::new(EchoAssistant),
    };
    let service = DashboardService::new(providers, ScoringConfig::default());
    api::router(AppState::new(service))
}

fn app() -> Router {
    app_with(Arc::new(TrendClimate))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn messages(body: &Value) -> Vec<String> {
    body["notices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["message"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], astrocast::VERSION);
    assert_eq!(body["assistant"], true);
}

// =============================================================================
// Report
// =============================================================================

#[tokio::test]
async fn test_report_for_an_available_date() {
    let (status, body) = get(app(), "/report?city=Paris&date=2024-07-10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["used_date"], "2024-07-10");
    assert_eq!(body["substituted"], false);
    assert_eq!(body["forecast"]["avg_temp"], 22.0);
    assert_eq!(body["rain_probability"], 0);
    assert!(body["suitability"]["score"].as_u64().unwrap() <= 100);
    assert!(body["suggestion"].is_string());
    assert_eq!(body["today"]["summary"], "Around 22C.");
    assert_eq!(body["pollution"]["label"], "Fair");
    assert_eq!(body["overview"].as_array().unwrap().len(), 2);
    assert!(messages(&body).is_empty());
}

#[tokio::test]
async fn test_report_substitutes_the_closest_date() {
    let (status, body) = get(app(), "/report?city=Paris&date=2024-07-12").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requested_date"], "2024-07-12");
    assert_eq!(body["used_date"], "2024-07-13");
    assert_eq!(body["substituted"], true);
    assert!(!messages(&body).is_empty());
}

#[tokio::test]
async fn test_report_with_empty_city_is_rejected() {
    let (status, body) = get(app(), "/report?city=%20&date=2024-07-10").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input: Empty city");
}

#[tokio::test]
async fn test_report_for_unknown_city_degrades_to_a_notice() {
    let (status, body) = get(app(), "/report?city=nowhere&date=2024-07-10").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["forecast"].is_null());
    assert!(messages(&body)[0].contains("Location not found"));
}

// =============================================================================
// Compare
// =============================================================================

#[tokio::test]
async fn test_compare_ranks_resolvable_cities() {
    // 2024-07-08 is a Monday
    let (status, body) = get(
        app(),
        "/compare?city_a=paris&city_b=nowhere&day=saturday&today=2024-07-08",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target_date"], "2024-07-13");
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["city"], "Paris");
    assert!(body["leader"].as_str().unwrap().starts_with("Best city: Paris"));
    assert!(body["fallback"].is_null());
    assert!(body["analysis"].as_str().unwrap().contains("City,Cond,Score"));
    assert!(messages(&body).iter().any(|m| m.starts_with("nowhere: ")));
}

// =============================================================================
// History
// =============================================================================

#[tokio::test]
async fn test_history_returns_the_monthly_average() {
    let (status, body) = get(app(), "/history?city=Paris&year=2020&month=7").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["year"], 2020);
    assert_eq!(body["month"], 7);
    assert_eq!(body["avg_rainfall_mm"], 3.0);
}

#[tokio::test]
async fn test_history_without_data_is_not_found() {
    let (status, body) = get(app(), "/history?city=Paris&year=1985&month=7").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No NASA POWER data for Paris in 1985-07");
}

#[tokio::test]
async fn test_history_rejects_invalid_month() {
    let (status, _) = get(app(), "/history?city=Paris&year=2020&month=13").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_provider_failure_is_bad_gateway() {
    let (status, body) = get(
        app_with(Arc::new(DownClimate)),
        "/history?city=Paris&year=2020&month=7",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch NASA POWER data: HTTP 503");
}

// =============================================================================
// Climate insight
// =============================================================================

#[tokio::test]
async fn test_climate_insight_compares_periods() {
    let (status, body) = get(
        app(),
        "/climate?city=Paris&month=7&hist_start=1990&hist_end=2000&recent_start=2015&recent_end=2024",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let comparison = &body["comparison"];
    assert_eq!(comparison["month_name"], "July");
    assert_eq!(comparison["historical_rain"], 2.0);
    assert_eq!(comparison["recent_rain"], 3.0);
    assert_eq!(comparison["deltas"]["rain_abs"], 1.0);
    assert_eq!(comparison["deltas"]["temp_abs"], 0.0);
    assert!(body["commentary"].is_null());
}

#[tokio::test]
async fn test_climate_insight_reports_invalid_periods() {
    let (status, body) = get(
        app(),
        "/climate?city=Paris&month=7&hist_start=2000&hist_end=1990&recent_start=1985&recent_end=2024",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["comparison"].is_null());
    let problems = messages(&body);
    assert!(problems.contains(&"Historical start must be <= end".to_string()));
    assert!(problems.iter().any(|m| m.contains("avoid overlap")));
}

#[tokio::test]
async fn test_climate_insight_rejects_years_outside_coverage() {
    let (status, body) = get(
        app(),
        "/climate?city=Paris&month=7&hist_start=-2147483648&hist_end=0&recent_start=1&recent_end=10",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid input: Years must be between 1981 and 2090, got: -2147483648"
    );
}

#[tokio::test]
async fn test_climate_commentary_on_request() {
    let (status, body) = get(app(), "/climate?city=Paris&month=7&commentary=true").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["comparison"].is_object());
    assert!(body["commentary"].is_string());
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat_answers_with_city_context() {
    let (status, body) = post_json(
        app(),
        "/chat",
        serde_json::json!({ "question": "Umbrella?", "city": "Paris" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Umbrella? [Current selected city: Paris]");
}

#[tokio::test]
async fn test_chat_includes_forecast_metrics_for_a_date() {
    let (status, body) = post_json(
        app(),
        "/chat",
        serde_json::json!({ "question": "Umbrella?", "city": "Paris", "date": "2024-07-10" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let answer = body["answer"].as_str().unwrap();
    assert!(answer.contains("temp 22.0C"));
    assert!(answer.ends_with("| Current selected city: Paris]"));
}

#[tokio::test]
async fn test_chat_rejects_empty_question() {
    let (status, body) = post_json(app(), "/chat", serde_json::json!({ "question": "   " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Question must not be empty"));
}
