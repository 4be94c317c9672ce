//! JSON API consumed by the dashboard frontend

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::climate::PeriodSelection;
use crate::dashboard::{
    ChatQuestion, CityReport, ClimateInsight, ComparisonReport, DashboardService, WeekendDay,
};
use crate::error::Provider;
use crate::models::{HistoricalAverage, YearRange};
use crate::{AstrocastError, VERSION};

pub mod error;

pub use error::{ApiError, ErrorResponse};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: DashboardService,
}

impl AppState {
    pub fn new(service: DashboardService) -> Self {
        Self { service }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub assistant: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub city: String,
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    #[serde(default)]
    pub city_a: String,
    #[serde(default)]
    pub city_b: String,
    #[serde(default)]
    pub day: WeekendDay,
    /// Reference date the next weekend is counted from; defaults to today
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub city: String,
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize)]
pub struct ClimateQuery {
    #[serde(default)]
    pub city: String,
    pub month: u32,
    pub hist_start: Option<i32>,
    pub hist_end: Option<i32>,
    pub recent_start: Option<i32>,
    pub recent_end: Option<i32>,
    #[serde(default)]
    pub commentary: bool,
}

impl ClimateQuery {
    fn selection(&self) -> PeriodSelection {
        let defaults = PeriodSelection::default();
        PeriodSelection {
            historical: YearRange::new(
                self.hist_start.unwrap_or(defaults.historical.start),
                self.hist_end.unwrap_or(defaults.historical.end),
            ),
            recent: YearRange::new(
                self.recent_start.unwrap_or(defaults.recent.start),
                self.recent_end.unwrap_or(defaults.recent.end),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/report", get(get_report))
        .route("/compare", get(get_compare))
        .route("/history", get(get_history))
        .route("/climate", get(get_climate))
        .route("/chat", post(post_chat))
        .with_state(state)
}

fn current_date() -> NaiveDate {
    Local::now().date_naive()
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
        assistant: state.service.assistant_configured(),
    })
}

async fn get_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<CityReport>, ApiError> {
    let date = query.date.unwrap_or_else(current_date);
    let report = state.service.report(&query.city, date).await?;
    Ok(Json(report))
}

async fn get_compare(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Json<ComparisonReport> {
    let cities = [query.city_a, query.city_b];
    let today = query.today.unwrap_or_else(current_date);
    Json(state.service.compare(&cities, query.day, today).await)
}

async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoricalAverage>, ApiError> {
    state
        .service
        .monthly_history(&query.city, query.year, query.month)
        .await
        .map(Json)
        .map_err(|err| match err {
            AstrocastError::ProviderUnavailable {
                provider: Provider::Climate,
                message,
            } => ApiError::BadGateway(format!("Failed to fetch NASA POWER data: {message}")),
            other => other.into(),
        })
}

async fn get_climate(
    State(state): State<AppState>,
    Query(query): Query<ClimateQuery>,
) -> Result<Json<ClimateInsight>, ApiError> {
    let insight = state
        .service
        .climate_insight(&query.city, query.month, query.selection(), query.commentary)
        .await?;
    Ok(Json(insight))
}

async fn post_chat(
    State(state): State<AppState>,
    Json(question): Json<ChatQuestion>,
) -> Result<Json<ChatResponse>, ApiError> {
    let answer = state.service.chat(&question).await?;
    Ok(Json(ChatResponse { answer }))
}
