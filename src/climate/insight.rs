//! Historical versus recent period comparison

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::Month;
use serde::{Deserialize, Serialize};

use super::aggregator::{ConfidenceLevel, PeriodAggregate, YearRecord};
use crate::Result;
use crate::error::AstrocastError;
use crate::models::YearRange;

/// Minimum `end - start` for a comparison period (five years inclusive)
const MIN_SPAN: i64 = 4;

/// The two year ranges a climate insight compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSelection {
    pub historical: YearRange,
    pub recent: YearRange,
}

impl Default for PeriodSelection {
    fn default() -> Self {
        Self {
            historical: YearRange::new(1985, 2000),
            recent: YearRange::new(2015, 2025),
        }
    }
}

impl PeriodSelection {
    /// Problems with the selection; empty when it can be compared
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let (hist, recent) = (self.historical, self.recent);

        if hist.start > hist.end {
            problems.push("Historical start must be <= end".to_string());
        }
        if recent.start > recent.end {
            problems.push("Recent start must be <= end".to_string());
        }
        if span(hist) < MIN_SPAN {
            problems.push("Historical span must be at least 5 years".to_string());
        }
        if span(recent) < MIN_SPAN {
            problems.push("Recent span must be at least 5 years".to_string());
        }
        if recent.start <= hist.end {
            problems.push(
                "Recent period should start after historical period ends to avoid overlap"
                    .to_string(),
            );
        }
        problems
    }
}

fn span(range: YearRange) -> i64 {
    i64::from(range.end) - i64::from(range.start)
}

/// Recent-minus-historical differences
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClimateDeltas {
    /// Rainfall difference in mm/day
    pub rain_abs: f64,
    /// Rainfall difference relative to the historical mean, in percent
    pub rain_pct: f64,
    /// Temperature difference in Celsius
    pub temp_abs: f64,
    /// Temperature difference relative to the historical mean, in percent
    pub temp_pct: f64,
}

impl ClimateDeltas {
    #[must_use]
    pub fn between(hist_rain: f64, hist_temp: f64, recent_rain: f64, recent_temp: f64) -> Self {
        let relative = |delta: f64, base: f64| if base == 0.0 { 0.0 } else { delta / base * 100.0 };
        let rain_abs = recent_rain - hist_rain;
        let temp_abs = recent_temp - hist_temp;
        Self {
            rain_abs,
            rain_pct: relative(rain_abs, hist_rain),
            temp_abs,
            temp_pct: relative(temp_abs, hist_temp),
        }
    }

    /// Rainfall change as a ratio of the historical mean
    #[must_use]
    pub fn rain_change_ratio(&self) -> f64 {
        self.rain_pct / 100.0
    }
}

/// Event-planning notes for a rainfall and a temperature change
#[must_use]
pub fn risk_notes(deltas: &ClimateDeltas, hist_temp: f64) -> (String, String) {
    let ratio = deltas.rain_change_ratio();
    let rain_note = if ratio > 0.5 {
        format!(
            "🚨 Rainfall increased by {:.0}%; higher precipitation risk for events.",
            ratio * 100.0
        )
    } else if ratio < -0.2 {
        format!(
            "🌿 Rainfall decreased by {:.0}%; slightly lower rain risk.",
            ratio.abs() * 100.0
        )
    } else {
        "✅ Rainfall change is moderate.".to_string()
    };

    let temp_change = if hist_temp == 0.0 { 0.0 } else { deltas.temp_abs };
    let temp_note = if temp_change > 1.5 {
        format!("🔥 Temp up {temp_change:.1}°C; added heat stress potential.")
    } else if temp_change < -1.0 {
        format!("❄️ Temp down {:.1}°C; cooler conditions trend.", temp_change.abs())
    } else {
        "🌡️ Temperature shift modest.".to_string()
    };

    (rain_note, temp_note)
}

/// Confidence of both periods and their combination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceSummary {
    pub historical_ratio: f64,
    pub historical_level: ConfidenceLevel,
    pub recent_ratio: f64,
    pub recent_level: ConfidenceLevel,
    /// Lower of the two period ratios
    pub overall_ratio: f64,
    pub overall_level: ConfidenceLevel,
    pub caption: String,
}

impl ConfidenceSummary {
    #[must_use]
    pub fn of(historical: &PeriodAggregate, recent: &PeriodAggregate) -> Self {
        let overall_ratio = historical.confidence_ratio().min(recent.confidence_ratio());
        let overall_level = ConfidenceLevel::from_ratio(overall_ratio);
        let caption = format!(
            "Data Confidence: {overall_level} (Hist {}/{} yrs; Recent {}/{} yrs)",
            historical.years_found(),
            historical.years_requested(),
            recent.years_found(),
            recent.years_requested()
        );

        Self {
            historical_ratio: historical.confidence_ratio(),
            historical_level: historical.confidence(),
            recent_ratio: recent.confidence_ratio(),
            recent_level: recent.confidence(),
            overall_ratio,
            overall_level,
            caption,
        }
    }
}

/// Union of both periods' yearly records, one per year, ordered by year
#[must_use]
pub fn chart_series(historical: &PeriodAggregate, recent: &PeriodAggregate) -> Vec<YearRecord> {
    let mut by_year: BTreeMap<i32, YearRecord> = BTreeMap::new();
    for record in historical.records.iter().chain(&recent.records) {
        by_year.entry(record.year).or_insert(*record);
    }
    by_year.into_values().collect()
}

/// Aggregated comparison of a historical and a recent period for one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateComparison {
    pub month: u32,
    pub month_name: String,
    pub historical_label: String,
    pub recent_label: String,
    pub historical_rain: f64,
    pub historical_temp: f64,
    pub recent_rain: f64,
    pub recent_temp: f64,
    pub deltas: ClimateDeltas,
    pub rain_note: String,
    pub temp_note: String,
    pub confidence: ConfidenceSummary,
    pub chart: Vec<YearRecord>,
}

/// English month name for 1-12
#[must_use]
pub fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map_or_else(|| format!("Month {month}"), |m| m.name().to_string())
}

/// Compare two aggregated periods; skipped when either holds no data
pub fn compare_periods(
    month: u32,
    historical: &PeriodAggregate,
    recent: &PeriodAggregate,
) -> Result<ClimateComparison> {
    let (Some(hist_rain), Some(hist_temp), Some(recent_rain), Some(recent_temp)) = (
        historical.mean_rainfall,
        historical.mean_temp,
        recent.mean_rainfall,
        recent.mean_temp,
    ) else {
        return Err(AstrocastError::skipped(
            "Climate data not sufficient for comparison.",
        ));
    };

    let deltas = ClimateDeltas::between(hist_rain, hist_temp, recent_rain, recent_temp);
    let (rain_note, temp_note) = risk_notes(&deltas, hist_temp);

    Ok(ClimateComparison {
        month,
        month_name: month_name(month),
        historical_label: historical.range.label(),
        recent_label: recent.range.label(),
        historical_rain: hist_rain,
        historical_temp: hist_temp,
        recent_rain,
        recent_temp,
        deltas,
        rain_note,
        temp_note,
        confidence: ConfidenceSummary::of(historical, recent),
        chart: chart_series(historical, recent),
    })
}

/// Prompt asking the assistant for a short trend commentary
#[must_use]
pub fn commentary_prompt(city: &str, comparison: &ClimateComparison) -> String {
    let d = &comparison.deltas;
    let mut tail = String::from("Year,Rainfall(mm/day),Temp(°C)\n");
    let skip = comparison.chart.len().saturating_sub(10);
    for record in comparison.chart.iter().skip(skip) {
        let _ = writeln!(tail, "{},{:.2},{:.2}", record.year, record.rainfall_mm, record.temp_c);
    }

    format!(
        "Provide a concise (<=120 words) climate trend commentary for {city} for month {}. \
         Highlight rainfall and temperature direction, magnitude (% and °C), and event planning implications. \
         Data confidence is {}. Data (recent vs historical):\n\
         Rain delta {:+.2} mm/day ({:+.1}%), Temp delta {:+.1} °C ({:+.1}%).\n\
         Recent period {} vs historical {}.\n\
         Recent tail data:\n{tail}",
        comparison.month_name,
        comparison.confidence.overall_level,
        d.rain_abs,
        d.rain_pct,
        d.temp_abs,
        d.temp_pct,
        comparison.recent_label,
        comparison.historical_label,
    )
}
