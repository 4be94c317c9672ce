//! Forecast normalization
//!
//! Groups raw forecast points by calendar day, averages each day and picks the
//! aggregate for a requested date, falling back to the nearest available day.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::models::{DailyAggregate, DayPhase, RawForecastPoint};

const DEFAULT_CONDITION: &str = "Clear";

/// Outcome of normalizing a payload for one target date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedForecast {
    /// Aggregate for the used date, `None` when the payload had no points
    pub aggregate: Option<DailyAggregate>,
    /// Date the aggregate belongs to
    pub used_date: NaiveDate,
    /// True when `used_date` differs from the requested date
    pub substituted: bool,
}

/// Group points by calendar date, keeping arrival order within a day
pub fn group_by_day(points: &[RawForecastPoint]) -> BTreeMap<NaiveDate, Vec<&RawForecastPoint>> {
    let mut days: BTreeMap<NaiveDate, Vec<&RawForecastPoint>> = BTreeMap::new();
    for point in points {
        days.entry(point.date()).or_default().push(point);
    }
    days
}

/// Aggregate the points of a single day; `None` for an empty set
#[must_use]
pub fn aggregate_day(date: NaiveDate, points: &[&RawForecastPoint]) -> Option<DailyAggregate> {
    if points.is_empty() {
        return None;
    }

    let count = points.len() as f64;
    let mean = |value: fn(&RawForecastPoint) -> f64| points.iter().map(|p| value(p)).sum::<f64>() / count;
    let (condition, phase) = dominant_condition(points);

    Some(DailyAggregate {
        date,
        avg_temp: mean(|p| p.temperature),
        avg_humidity: mean(|p| p.humidity),
        avg_wind: mean(|p| p.wind_speed),
        total_rain: points.iter().map(|p| p.precipitation).sum(),
        condition,
        phase,
        point_count: points.len(),
    })
}

/// All daily aggregates of a payload in chronological order
#[must_use]
pub fn daily_aggregates(points: &[RawForecastPoint]) -> Vec<DailyAggregate> {
    group_by_day(points)
        .into_iter()
        .filter_map(|(date, day_points)| aggregate_day(date, &day_points))
        .collect()
}

/// Most frequent (condition, phase) pair; ties go to the smaller condition, then phase
#[must_use]
pub fn dominant_condition(points: &[&RawForecastPoint]) -> (String, DayPhase) {
    let mut frequency: HashMap<(&str, DayPhase), usize> = HashMap::new();
    for point in points {
        *frequency
            .entry((point.condition.as_str(), point.phase))
            .or_insert(0) += 1;
    }

    frequency
        .into_iter()
        .min_by(|(a, a_count), (b, b_count)| {
            b_count
                .cmp(a_count)
                .then_with(|| a.0.cmp(b.0))
                .then_with(|| a.1.cmp(&b.1))
        })
        .map(|((condition, phase), _)| (condition.to_string(), phase))
        .unwrap_or_else(|| (DEFAULT_CONDITION.to_string(), DayPhase::Day))
}

/// Available date closest to `target`; equal distances resolve to the earliest date
pub fn nearest_date<I>(available: I, target: NaiveDate) -> Option<NaiveDate>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut best: Option<(i64, NaiveDate)> = None;
    for date in available {
        let distance = (date - target).num_days().abs();
        let closer = match best {
            None => true,
            Some((best_distance, best_date)) => {
                distance < best_distance || (distance == best_distance && date < best_date)
            }
        };
        if closer {
            best = Some((distance, date));
        }
    }
    best.map(|(_, date)| date)
}

/// Produce the aggregate for `target`, substituting the nearest day when needed
#[must_use]
pub fn normalize(points: &[RawForecastPoint], target: NaiveDate) -> NormalizedForecast {
    let days = group_by_day(points);

    if let Some(day_points) = days.get(&target) {
        return NormalizedForecast {
            aggregate: aggregate_day(target, day_points),
            used_date: target,
            substituted: false,
        };
    }

    match nearest_date(days.keys().copied(), target) {
        Some(used) => {
            debug!("No forecast points for {}, using nearest date {}", target, used);
            NormalizedForecast {
                aggregate: days.get(&used).and_then(|p| aggregate_day(used, p)),
                used_date: used,
                substituted: true,
            }
        }
        None => {
            debug!("Forecast payload is empty, nothing to normalize");
            NormalizedForecast {
                aggregate: None,
                used_date: target,
                substituted: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn point(ts: &str, temp: f64, humidity: f64, wind: f64, rain: f64) -> RawForecastPoint {
        RawForecastPoint {
            timestamp: chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            temperature: temp,
            humidity,
            wind_speed: wind,
            precipitation: rain,
            condition: "Clear".to_string(),
            phase: DayPhase::Day,
        }
    }

    fn with_condition(mut p: RawForecastPoint, condition: &str, phase: DayPhase) -> RawForecastPoint {
        p.condition = condition.to_string();
        p.phase = phase;
        p
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_three_points_aggregate() {
        let points = vec![
            point("2024-07-10 09:00:00", 20.0, 60.0, 2.0, 0.0),
            point("2024-07-10 12:00:00", 22.0, 65.0, 3.0, 1.0),
            point("2024-07-10 15:00:00", 24.0, 70.0, 4.0, 0.0),
        ];

        let result = normalize(&points, date("2024-07-10"));
        let aggregate = result.aggregate.unwrap();

        assert!(!result.substituted);
        assert_eq!(result.used_date, date("2024-07-10"));
        assert_eq!(aggregate.point_count, 3);
        assert!((aggregate.avg_temp - 22.0).abs() < 1e-9);
        assert!((aggregate.avg_humidity - 65.0).abs() < 1e-9);
        assert!((aggregate.avg_wind - 3.0).abs() < 1e-9);
        assert!((aggregate.total_rain - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_every_point_lands_in_exactly_one_day() {
        let points = vec![
            point("2024-07-10 21:00:00", 20.0, 60.0, 2.0, 0.0),
            point("2024-07-11 00:00:00", 18.0, 70.0, 1.0, 0.5),
            point("2024-07-11 03:00:00", 17.0, 75.0, 1.0, 0.0),
            point("2024-07-12 12:00:00", 25.0, 50.0, 3.0, 0.0),
        ];

        let days = group_by_day(&points);
        let total: usize = days.values().map(Vec::len).sum();
        assert_eq!(total, points.len());

        for (day, members) in &days {
            assert!(members.iter().all(|p| p.date() == *day));
        }

        let aggregates = daily_aggregates(&points);
        let counts: Vec<usize> = aggregates.iter().map(|a| a.point_count).collect();
        assert_eq!(counts, vec![1, 2, 1]);
    }

    #[test]
    fn test_grouping_keeps_arrival_order() {
        let points = vec![
            point("2024-07-10 15:00:00", 24.0, 70.0, 4.0, 0.0),
            point("2024-07-10 09:00:00", 20.0, 60.0, 2.0, 0.0),
        ];
        let days = group_by_day(&points);
        let members = &days[&date("2024-07-10")];
        assert_eq!(members[0].temperature, 24.0);
        assert_eq!(members[1].temperature, 20.0);
    }

    #[test]
    fn test_dominant_tie_breaks_alphabetically() {
        let base = point("2024-07-10 09:00:00", 20.0, 60.0, 2.0, 0.0);
        let points = vec![
            with_condition(base.clone(), "Rain", DayPhase::Day),
            with_condition(base.clone(), "Clouds", DayPhase::Day),
            with_condition(base.clone(), "Rain", DayPhase::Day),
            with_condition(base, "Clouds", DayPhase::Day),
        ];
        let refs: Vec<&RawForecastPoint> = points.iter().collect();

        assert_eq!(
            dominant_condition(&refs),
            ("Clouds".to_string(), DayPhase::Day)
        );
    }

    #[test]
    fn test_dominant_phase_tie_prefers_day() {
        let base = point("2024-07-10 09:00:00", 20.0, 60.0, 2.0, 0.0);
        let points = vec![
            with_condition(base.clone(), "Clear", DayPhase::Night),
            with_condition(base, "Clear", DayPhase::Day),
        ];
        let refs: Vec<&RawForecastPoint> = points.iter().collect();
        assert_eq!(dominant_condition(&refs).1, DayPhase::Day);
    }

    #[test]
    fn test_dominant_highest_count_wins() {
        let base = point("2024-07-10 09:00:00", 20.0, 60.0, 2.0, 0.0);
        let points = vec![
            with_condition(base.clone(), "Rain", DayPhase::Night),
            with_condition(base.clone(), "Rain", DayPhase::Night),
            with_condition(base, "Clouds", DayPhase::Day),
        ];
        let refs: Vec<&RawForecastPoint> = points.iter().collect();
        assert_eq!(
            dominant_condition(&refs),
            ("Rain".to_string(), DayPhase::Night)
        );
    }

    #[test]
    fn test_dominant_defaults_to_clear_day() {
        assert_eq!(dominant_condition(&[]), ("Clear".to_string(), DayPhase::Day));
    }

    #[test]
    fn test_empty_payload_reports_no_data() {
        let result = normalize(&[], date("2024-07-10"));
        assert!(result.aggregate.is_none());
        assert_eq!(result.used_date, date("2024-07-10"));
        assert!(!result.substituted);
        assert!(aggregate_day(date("2024-07-10"), &[]).is_none());
    }

    #[test]
    fn test_missing_date_substitutes_nearest() {
        let points = vec![
            point("2024-07-10 12:00:00", 20.0, 60.0, 2.0, 0.0),
            point("2024-07-14 12:00:00", 26.0, 40.0, 5.0, 0.0),
        ];

        let result = normalize(&points, date("2024-07-13"));
        assert!(result.substituted);
        assert_eq!(result.used_date, date("2024-07-14"));
        assert_eq!(result.aggregate.unwrap().date, date("2024-07-14"));
    }

    #[rstest]
    #[case("2024-07-12", "2024-07-10")]
    #[case("2024-07-05", "2024-07-10")]
    #[case("2024-07-20", "2024-07-14")]
    #[case("2024-07-13", "2024-07-14")]
    fn test_nearest_date_prefers_earliest_on_tie(#[case] target: &str, #[case] expected: &str) {
        let available = [date("2024-07-10"), date("2024-07-14")];
        assert_eq!(
            nearest_date(available, date(target)),
            Some(date(expected))
        );
    }

    #[test]
    fn test_fallback_is_idempotent() {
        let points = vec![
            point("2024-07-10 12:00:00", 20.0, 60.0, 2.0, 0.0),
            point("2024-07-11 12:00:00", 21.0, 61.0, 2.5, 0.2),
        ];
        let first = normalize(&points, date("2024-07-20"));
        let second = normalize(&points, date("2024-07-20"));
        assert_eq!(first, second);
        assert_eq!(first.used_date, date("2024-07-11"));
    }
}
