//! Weekend comparison between cities

use std::borrow::Cow;
use std::fmt::Write as _;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::DashboardService;
use super::cards::{condition_label, round1};
use crate::error::Notice;
use crate::models::DailyAggregate;
use crate::suitability::{self, ForecastInputs, HistoricalInputs, Rating};
use crate::weather::normalize;

const ANALYSIS_QUESTION: &str = "Which city is better and why?";
const ANALYSIS_PROMPT: &str =
    "Compare these cities for a weekend outdoor parade and give pros and cons then a recommendation.\n";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekendDay {
    #[default]
    Saturday,
    Sunday,
}

impl WeekendDay {
    #[must_use]
    pub fn weekday(self) -> Weekday {
        match self {
            WeekendDay::Saturday => Weekday::Sat,
            WeekendDay::Sunday => Weekday::Sun,
        }
    }
}

/// Next occurrence of the weekend day, counting today
#[must_use]
pub fn next_weekend_day(today: NaiveDate, day: WeekendDay) -> NaiveDate {
    let target = i64::from(day.weekday().num_days_from_monday());
    let current = i64::from(today.weekday().num_days_from_monday());
    today + Duration::days((target - current).rem_euclid(7))
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest
#[must_use]
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_alpha = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if previous_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(c);
            previous_alpha = false;
        }
    }
    out
}

/// One scored city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub city: String,
    pub score: u8,
    pub rating: Rating,
    pub rain_probability: u8,
    pub temperature: f64,
    pub humidity: f64,
    pub wind: f64,
    pub rain: f64,
    pub condition: String,
    pub suggestion: String,
    pub used_date: NaiveDate,
    pub substituted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub day: WeekendDay,
    pub target_date: NaiveDate,
    pub rows: Vec<ComparisonRow>,
    pub leader: Option<String>,
    pub fallback: Option<String>,
    pub analysis: Option<String>,
    pub notices: Vec<Notice>,
}

/// Rows as CSV, the context handed to the assistant
#[must_use]
pub fn rows_csv(rows: &[ComparisonRow]) -> String {
    let mut csv = String::from(
        "City,Cond,Score,RainProb(%),Temp(°C),Humidity(%),Wind(m/s),Rain(mm),Suggestion,UsedDate,Substituted\n",
    );
    for row in rows {
        let _ = writeln!(
            csv,
            "{},{},{},{},{:.1},{:.0},{:.1},{:.1},{},{},{}",
            csv_field(&row.city),
            csv_field(&row.condition),
            row.score,
            row.rain_probability,
            row.temperature,
            row.humidity,
            row.wind,
            row.rain,
            csv_field(&row.suggestion),
            row.used_date,
            row.substituted
        );
    }
    csv
}

/// Quote a field containing a delimiter, quote or line break
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

impl DashboardService {
    /// Score each city for the next Saturday or Sunday and rank them
    #[instrument(level = "info", skip(self, cities))]
    pub async fn compare(&self, cities: &[String], day: WeekendDay, today: NaiveDate) -> ComparisonReport {
        let target_date = next_weekend_day(today, day);
        let mut rows = Vec::with_capacity(cities.len());
        let mut errors = Vec::new();

        for city in cities {
            match self.score_city(city.trim(), target_date).await {
                Ok(row) => rows.push(row),
                Err(reason) => {
                    warn!("Comparison skipped {}: {}", city, reason);
                    errors.push(Notice::warning(format!("{city}: {reason}")));
                }
            }
        }

        // Stable: ties keep input order
        rows.sort_by(|a, b| b.score.cmp(&a.score));

        let leader = rows.first().map(|row| {
            format!(
                "Best city: {} • Score {}/100 – {}",
                row.city, row.score, row.suggestion
            )
        });

        let substituted: Vec<String> = rows
            .iter()
            .filter(|row| row.substituted)
            .map(|row| format!("{}→{}", row.city, row.used_date))
            .collect();
        let fallback = (!substituted.is_empty()).then(|| {
            format!(
                "Forecast fallback used (nearest available date): {}",
                substituted.join(", ")
            )
        });

        let mut notices = Vec::new();
        let mut analysis = None;
        if !rows.is_empty() && self.providers.assistant.is_configured() {
            let context = format!("{ANALYSIS_PROMPT}{}", rows_csv(&rows));
            match self.providers.assistant.answer(ANALYSIS_QUESTION, &context).await {
                Ok(text) => analysis = Some(text),
                Err(e) => notices.push(Notice::warning(format!("AI summary failed: {}", e.user_message()))),
            }
        }
        notices.extend(errors);

        ComparisonReport {
            day,
            target_date,
            rows,
            leader,
            fallback,
            analysis,
            notices,
        }
    }

    async fn score_city(&self, city: &str, target_date: NaiveDate) -> Result<ComparisonRow, String> {
        if city.is_empty() {
            return Err("Empty city".to_string());
        }

        let location = self
            .resolver
            .resolve(city)
            .await
            .map_err(|e| format!("Forecast error: {e}"))?;
        let payload = self
            .providers
            .forecast
            .fetch_forecast(&location)
            .await
            .map_err(|e| format!("Forecast error: {e}"))?;

        let normalized = normalize(&payload.points, target_date);
        let Some(day) = normalized.aggregate else {
            return Err("No forecast data in window".to_string());
        };

        // Neutral history when the climate lookup fails or comes back empty
        let history = match self
            .providers
            .climate
            .fetch_monthly(&location, target_date.year(), target_date.month())
            .await
        {
            Ok(Some(history)) => HistoricalInputs {
                avg_rainfall_mm: history.avg_rainfall_mm,
                avg_temp_c: history.avg_temp_c,
            },
            Ok(None) | Err(_) => {
                debug!("Using neutral history for {}", city);
                neutral_history(&day)
            }
        };

        let rain_probability = suitability::rain_probability(day.total_rain);
        let inputs = ForecastInputs {
            rain_probability: f64::from(rain_probability),
            temperature: day.avg_temp,
            humidity: day.avg_humidity,
            wind_speed: day.avg_wind,
        };
        let result = suitability::score(&inputs, &history, &self.scoring);

        Ok(ComparisonRow {
            city: title_case(city),
            score: result.score,
            rating: result.rating,
            rain_probability,
            temperature: round1(day.avg_temp),
            humidity: day.avg_humidity.round(),
            wind: round1(day.avg_wind),
            rain: round1(day.total_rain),
            condition: condition_label(&day),
            suggestion: suitability::suggest(&inputs, &self.scoring).to_string(),
            used_date: normalized.used_date,
            substituted: normalized.substituted,
        })
    }
}

fn neutral_history(day: &DailyAggregate) -> HistoricalInputs {
    HistoricalInputs {
        avg_rainfall_mm: 0.0,
        avg_temp_c: day.avg_temp,
    }
}
