//! Historical versus recent climate insight for one city and month

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::{DashboardService, FIRST_CLIMATE_YEAR, LAST_CLIMATE_YEAR, validate_month};
use crate::Result;
use crate::climate::insight::{self, ClimateComparison, PeriodSelection};
use crate::climate::aggregate_years;
use crate::error::{AstrocastError, Notice};
use crate::models::Location;

#[derive(Debug, Clone, Serialize)]
pub struct ClimateInsight {
    pub city: String,
    pub month: u32,
    pub selection: PeriodSelection,
    pub location: Option<Location>,
    pub comparison: Option<ClimateComparison>,
    pub commentary: Option<String>,
    pub notices: Vec<Notice>,
}

impl DashboardService {
    /// Aggregate both periods and compare them; invalid periods return their problems as warnings
    #[instrument(level = "info", skip(self))]
    pub async fn climate_insight(
        &self,
        city: &str,
        month: u32,
        selection: PeriodSelection,
        with_commentary: bool,
    ) -> Result<ClimateInsight> {
        validate_month(month)?;
        validate_years(&selection)?;

        let mut view = ClimateInsight {
            city: city.trim().to_string(),
            month,
            selection,
            location: None,
            comparison: None,
            commentary: None,
            notices: Vec::new(),
        };

        let problems = selection.validate();
        if !problems.is_empty() {
            view.notices.extend(problems.into_iter().map(Notice::warning));
            return Ok(view);
        }

        let location = match self.resolver.resolve(city).await {
            Ok(location) => location,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                view.notices.push(Notice::from(&e));
                return Ok(view);
            }
        };

        let climate = &*self.providers.climate;
        let (historical, recent) = tokio::join!(
            aggregate_years(climate, &location, month, selection.historical.start, selection.historical.end),
            aggregate_years(climate, &location, month, selection.recent.start, selection.recent.end),
        );

        let comparison = match insight::compare_periods(month, &historical, &recent) {
            Ok(comparison) => comparison,
            Err(e) => {
                view.notices.push(Notice::warning(e.user_message()));
                view.location = Some(location);
                return Ok(view);
            }
        };

        info!(
            "Climate insight for {} month {}: rain {:+.2} mm/day, temp {:+.1} °C ({})",
            location.name,
            month,
            comparison.deltas.rain_abs,
            comparison.deltas.temp_abs,
            comparison.confidence.overall_level
        );

        if with_commentary && self.providers.assistant.is_configured() {
            let prompt = insight::commentary_prompt(&location.name, &comparison);
            match self.providers.assistant.answer(&prompt, "").await {
                Ok(text) => view.commentary = Some(text),
                Err(e) => {
                    warn!("Climate commentary failed: {}", e);
                    view.notices
                        .push(Notice::warning(format!("AI commentary failed: {}", e.user_message())));
                }
            }
        }

        view.location = Some(location);
        view.comparison = Some(comparison);
        Ok(view)
    }
}

/// Every bound of both periods must lie within the supported years
fn validate_years(selection: &PeriodSelection) -> Result<()> {
    let (hist, recent) = (selection.historical, selection.recent);
    for year in [hist.start, hist.end, recent.start, recent.end] {
        if !(FIRST_CLIMATE_YEAR..=LAST_CLIMATE_YEAR).contains(&year) {
            return Err(AstrocastError::validation(format!(
                "Years must be between {FIRST_CLIMATE_YEAR} and {LAST_CLIMATE_YEAR}, got: {year}"
            )));
        }
    }
    Ok(())
}
