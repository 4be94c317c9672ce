//! Event suitability scoring
//!
//! Combines the forecast for a day with the historical norm of its month into
//! a 0-100 score, a rating message and a separate activity suggestion.

use serde::{Deserialize, Serialize};

pub mod config;

pub use config::{Rating, ScoreBand, ScoringConfig};

/// Forecast metrics fed to the scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastInputs {
    /// Probability of rain in percent, 0-100
    pub rain_probability: f64,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
}

/// Historical context for the same month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalInputs {
    /// Average rainfall in mm/day
    pub avg_rainfall_mm: f64,
    /// Average temperature in Celsius
    pub avg_temp_c: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityResult {
    /// Integer score in [0, 100]
    pub score: u8,
    pub rating: Rating,
    pub message: String,
}

/// Map total precipitation in mm to a coarse rain probability bucket
#[must_use]
pub fn rain_probability(total_rain_mm: f64) -> u8 {
    if total_rain_mm > 5.0 {
        90
    } else if total_rain_mm > 0.0 {
        70
    } else {
        0
    }
}

fn capped(value: f64, cap: f64) -> f64 {
    value.max(0.0).min(cap)
}

/// Rain penalty after the historical wet/dry month adjustment
fn rain_penalty(probability: f64, history: &HistoricalInputs, config: &ScoringConfig) -> f64 {
    let p = probability.clamp(0.0, 100.0);
    let raw = p * (config.rain_base_weight + config.rain_progressive_weight * p / 100.0);

    let factor = if history.avg_rainfall_mm >= config.wet_month_rainfall_mm {
        config.wet_month_factor
    } else if history.avg_rainfall_mm <= config.dry_month_rainfall_mm {
        config.dry_month_factor
    } else {
        1.0
    };
    capped(raw * factor, config.rain_penalty_cap)
}

fn temperature_penalty(temperature: f64, config: &ScoringConfig) -> f64 {
    let outside = if temperature < config.comfort_min_c {
        config.comfort_min_c - temperature
    } else if temperature > config.comfort_max_c {
        temperature - config.comfort_max_c
    } else {
        0.0
    };
    capped(outside * config.temp_penalty_per_degree, config.temp_penalty_cap)
}

fn anomaly_penalty(temperature: f64, history: &HistoricalInputs, config: &ScoringConfig) -> f64 {
    let excess = (temperature - history.avg_temp_c).abs() - config.temp_anomaly_threshold_c;
    capped(
        excess * config.temp_anomaly_penalty_per_degree,
        config.temp_anomaly_penalty_cap,
    )
}

/// Score a forecast against its month's climate norm
#[must_use]
pub fn score(
    forecast: &ForecastInputs,
    history: &HistoricalInputs,
    config: &ScoringConfig,
) -> SuitabilityResult {
    let humidity = capped(
        (forecast.humidity - config.humidity_threshold) * config.humidity_penalty_per_percent,
        config.humidity_penalty_cap,
    );
    let wind = capped(
        (forecast.wind_speed - config.wind_threshold_ms) * config.wind_penalty_per_ms,
        config.wind_penalty_cap,
    );

    let total = 100.0
        - rain_penalty(forecast.rain_probability, history, config)
        - temperature_penalty(forecast.temperature, config)
        - humidity
        - wind
        - anomaly_penalty(forecast.temperature, history, config);

    let score = total.clamp(0.0, 100.0).round() as u8;
    let band = config.band_for(score);

    SuitabilityResult {
        score,
        rating: band.rating,
        message: band.message,
    }
}

/// Suggest an activity plan from the forecast alone
#[must_use]
pub fn suggest(forecast: &ForecastInputs, config: &ScoringConfig) -> &'static str {
    if forecast.rain_probability >= config.indoor_rain_probability {
        "Consider indoor backup"
    } else if forecast.wind_speed > config.windy_suggestion_ms {
        "Windy: secure banners and light decorations"
    } else if forecast.rain_probability >= config.showers_rain_probability {
        "Possible showers: keep umbrellas handy"
    } else {
        "Great for outdoor parade"
    }
}
