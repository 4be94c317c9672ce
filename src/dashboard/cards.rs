//! Display rows for daily forecasts

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{DailyAggregate, DayPhase};

/// Emoji for a dominant condition, falling back to its daytime variant
#[must_use]
pub fn condition_emoji(condition: &str, phase: DayPhase) -> &'static str {
    phase_emoji(condition, phase)
        .or_else(|| phase_emoji(condition, DayPhase::Day))
        .unwrap_or("☀️")
}

fn phase_emoji(condition: &str, phase: DayPhase) -> Option<&'static str> {
    let emoji = match (condition, phase) {
        ("Clear", DayPhase::Day) => "☀️",
        ("Clear", DayPhase::Night) => "🌙",
        ("Clouds", DayPhase::Day) => "⛅",
        ("Clouds", DayPhase::Night) => "☁️",
        ("Rain", DayPhase::Day) => "🌧️",
        ("Drizzle", DayPhase::Day) => "🌦️",
        ("Thunderstorm", DayPhase::Day) => "⛈️",
        ("Snow", DayPhase::Day) => "❄️",
        ("Mist" | "Fog" | "Haze", DayPhase::Day) => "🌫️",
        _ => return None,
    };
    Some(emoji)
}

/// "{emoji} {condition}" for an aggregate
#[must_use]
pub fn condition_label(aggregate: &DailyAggregate) -> String {
    format!(
        "{} {}",
        condition_emoji(&aggregate.condition, aggregate.phase),
        aggregate.condition
    )
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn rain_label(total_rain: f64) -> String {
    if total_rain == 0.0 {
        "—".to_string()
    } else {
        format!("{total_rain:.1} mm")
    }
}

/// One day in the five-day overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastCard {
    pub weekday: String,
    pub date: NaiveDate,
    pub condition: String,
    pub temperature: String,
    pub humidity: String,
    pub wind: String,
    pub rain: String,
    pub avg_temp: f64,
    pub avg_humidity: f64,
    pub avg_wind: f64,
    pub total_rain: f64,
}

impl From<&DailyAggregate> for ForecastCard {
    fn from(day: &DailyAggregate) -> Self {
        Self {
            weekday: day.date.format("%a").to_string(),
            date: day.date,
            condition: condition_label(day),
            temperature: format!("{:.1}°C", day.avg_temp),
            humidity: format!("{:.0}%", day.avg_humidity),
            wind: format!("{:.1} m/s", day.avg_wind),
            rain: rain_label(day.total_rain),
            avg_temp: round1(day.avg_temp),
            avg_humidity: round1(day.avg_humidity),
            avg_wind: round1(day.avg_wind),
            total_rain: round1(day.total_rain),
        }
    }
}

/// Headline card for the selected day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayCard {
    pub title: String,
    pub metrics: Vec<String>,
    pub summary: Option<String>,
}

impl TodayCard {
    #[must_use]
    pub fn new(day: &DailyAggregate, score: Option<u8>, summary: Option<String>) -> Self {
        let mut metrics = vec![
            format!("🌡️ {:.1}°C", day.avg_temp),
            format!("💧 {:.0}%", day.avg_humidity),
            format!("🌬️ {:.1} m/s", day.avg_wind),
            format!("🌧️ {:.1} mm", day.total_rain),
        ];
        if let Some(score) = score {
            metrics.push(format!("🎯 Score {score}/100"));
        }

        Self {
            title: format!("Today's Forecast {}", condition_label(day)),
            metrics,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(condition: &str, phase: DayPhase, total_rain: f64) -> DailyAggregate {
        DailyAggregate {
            date: NaiveDate::from_ymd_opt(2024, 7, 10).unwrap(),
            avg_temp: 21.26,
            avg_humidity: 64.4,
            avg_wind: 3.06,
            total_rain,
            condition: condition.to_string(),
            phase,
            point_count: 8,
        }
    }

    #[rstest]
    #[case("Clear", DayPhase::Night, "🌙")]
    #[case("Clouds", DayPhase::Day, "⛅")]
    #[case("Rain", DayPhase::Night, "🌧️")]
    #[case("Fog", DayPhase::Night, "🌫️")]
    #[case("Tornado", DayPhase::Day, "☀️")]
    fn test_condition_emoji(#[case] condition: &str, #[case] phase: DayPhase, #[case] expected: &str) {
        assert_eq!(condition_emoji(condition, phase), expected);
    }

    #[test]
    fn test_forecast_card_formatting() {
        let card = ForecastCard::from(&day("Clouds", DayPhase::Day, 0.0));
        assert_eq!(card.weekday, "Wed");
        assert_eq!(card.condition, "⛅ Clouds");
        assert_eq!(card.temperature, "21.3°C");
        assert_eq!(card.humidity, "64%");
        assert_eq!(card.wind, "3.1 m/s");
        assert_eq!(card.rain, "—");
        assert_eq!(card.avg_humidity, 64.4);
    }

    #[test]
    fn test_forecast_card_rain_is_shown_when_present() {
        let card = ForecastCard::from(&day("Rain", DayPhase::Day, 2.34));
        assert_eq!(card.rain, "2.3 mm");
        assert_eq!(card.total_rain, 2.3);
    }

    #[test]
    fn test_today_card_includes_score_when_known() {
        let card = TodayCard::new(&day("Clear", DayPhase::Day, 0.0), Some(72), None);
        assert_eq!(card.title, "Today's Forecast ☀️ Clear");
        assert_eq!(card.metrics.len(), 5);
        assert_eq!(card.metrics[4], "🎯 Score 72/100");

        let without = TodayCard::new(&day("Clear", DayPhase::Day, 0.0), None, None);
        assert_eq!(without.metrics.len(), 4);
    }
}
