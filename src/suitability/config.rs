//! Scoring weights, thresholds and rating bands

use serde::{Deserialize, Serialize};

/// Qualitative rating attached to a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Rating {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::Fair => "Fair",
            Rating::Poor => "Poor",
        }
    }
}

/// Lower score bound for a rating and the message shown for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    pub min_score: u8,
    pub rating: Rating,
    pub message: String,
}

/// Configuration table driving the suitability scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Lower edge of the comfortable temperature band in Celsius
    pub comfort_min_c: f64,
    /// Upper edge of the comfortable temperature band in Celsius
    pub comfort_max_c: f64,
    pub temp_penalty_per_degree: f64,
    pub temp_penalty_cap: f64,

    /// Relative humidity in percent above which points are deducted
    pub humidity_threshold: f64,
    pub humidity_penalty_per_percent: f64,
    pub humidity_penalty_cap: f64,

    /// Wind speed in m/s above which points are deducted
    pub wind_threshold_ms: f64,
    pub wind_penalty_per_ms: f64,
    pub wind_penalty_cap: f64,

    /// Rain penalty is `p * (rain_base_weight + rain_progressive_weight * p / 100)`
    pub rain_base_weight: f64,
    pub rain_progressive_weight: f64,
    pub rain_penalty_cap: f64,

    /// Historical mm/day at or above which a month counts as wet
    pub wet_month_rainfall_mm: f64,
    /// Rain penalty multiplier for wet months
    pub wet_month_factor: f64,
    /// Historical mm/day at or below which a month counts as dry
    pub dry_month_rainfall_mm: f64,
    /// Rain penalty multiplier for dry months
    pub dry_month_factor: f64,

    /// Deviation from the historical mean temperature tolerated without penalty
    pub temp_anomaly_threshold_c: f64,
    pub temp_anomaly_penalty_per_degree: f64,
    pub temp_anomaly_penalty_cap: f64,

    /// Rating bands, checked from the highest `min_score` down
    pub bands: Vec<ScoreBand>,

    /// Rain probability at which an indoor backup is suggested
    pub indoor_rain_probability: f64,
    /// Rain probability at which showers are mentioned
    pub showers_rain_probability: f64,
    /// Wind speed in m/s above which the suggestion warns about wind
    pub windy_suggestion_ms: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            comfort_min_c: 18.0,
            comfort_max_c: 26.0,
            temp_penalty_per_degree: 2.5,
            temp_penalty_cap: 30.0,
            humidity_threshold: 70.0,
            humidity_penalty_per_percent: 0.5,
            humidity_penalty_cap: 15.0,
            wind_threshold_ms: 6.0,
            wind_penalty_per_ms: 3.0,
            wind_penalty_cap: 25.0,
            rain_base_weight: 0.2,
            rain_progressive_weight: 0.4,
            rain_penalty_cap: 60.0,
            wet_month_rainfall_mm: 5.0,
            wet_month_factor: 0.75,
            dry_month_rainfall_mm: 1.0,
            dry_month_factor: 1.25,
            temp_anomaly_threshold_c: 5.0,
            temp_anomaly_penalty_per_degree: 1.0,
            temp_anomaly_penalty_cap: 10.0,
            bands: default_bands(),
            indoor_rain_probability: 70.0,
            showers_rain_probability: 30.0,
            windy_suggestion_ms: 10.0,
        }
    }
}

fn default_bands() -> Vec<ScoreBand> {
    vec![
        ScoreBand {
            min_score: 80,
            rating: Rating::Excellent,
            message: "Excellent conditions for an outdoor event!".to_string(),
        },
        ScoreBand {
            min_score: 60,
            rating: Rating::Good,
            message: "Good conditions with minor concerns.".to_string(),
        },
        ScoreBand {
            min_score: 40,
            rating: Rating::Fair,
            message: "Fair conditions; be ready for some discomfort.".to_string(),
        },
        ScoreBand {
            min_score: 0,
            rating: Rating::Poor,
            message: "Poor conditions; consider rescheduling.".to_string(),
        },
    ]
}

impl ScoringConfig {
    /// Band for a score; scores below every band fall into the lowest one
    #[must_use]
    pub fn band_for(&self, score: u8) -> ScoreBand {
        let mut bands: Vec<&ScoreBand> = self.bands.iter().collect();
        bands.sort_by(|a, b| b.min_score.cmp(&a.min_score));

        bands
            .iter()
            .find(|band| score >= band.min_score)
            .or_else(|| bands.last())
            .map(|band| (*band).clone())
            .unwrap_or_else(|| ScoreBand {
                min_score: 0,
                rating: Rating::Poor,
                message: Rating::Poor.as_str().to_string(),
            })
    }

    /// Check the table for inconsistent values
    pub fn validate(&self) -> Result<(), String> {
        if self.comfort_min_c > self.comfort_max_c {
            return Err("scoring.comfort_min_c must not exceed scoring.comfort_max_c".to_string());
        }
        if self.dry_month_rainfall_mm > self.wet_month_rainfall_mm {
            return Err(
                "scoring.dry_month_rainfall_mm must not exceed scoring.wet_month_rainfall_mm"
                    .to_string(),
            );
        }
        let weights = [
            self.temp_penalty_per_degree,
            self.temp_penalty_cap,
            self.humidity_penalty_per_percent,
            self.humidity_penalty_cap,
            self.wind_penalty_per_ms,
            self.wind_penalty_cap,
            self.rain_base_weight,
            self.rain_progressive_weight,
            self.rain_penalty_cap,
            self.wet_month_factor,
            self.dry_month_factor,
            self.temp_anomaly_penalty_per_degree,
            self.temp_anomaly_penalty_cap,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("scoring weights must be finite and non-negative".to_string());
        }
        if self.bands.is_empty() {
            return Err("scoring.bands must contain at least one band".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_band_lookup() {
        let config = ScoringConfig::default();
        assert_eq!(config.band_for(100).rating, Rating::Excellent);
        assert_eq!(config.band_for(80).rating, Rating::Excellent);
        assert_eq!(config.band_for(79).rating, Rating::Good);
        assert_eq!(config.band_for(40).rating, Rating::Fair);
        assert_eq!(config.band_for(0).rating, Rating::Poor);
    }

    #[test]
    fn test_unsorted_bands_still_resolve() {
        let mut config = ScoringConfig::default();
        config.bands.reverse();
        assert_eq!(config.band_for(85).rating, Rating::Excellent);
        assert_eq!(config.band_for(10).rating, Rating::Poor);
    }

    #[test]
    fn test_inverted_comfort_band_rejected() {
        let config = ScoringConfig {
            comfort_min_c: 30.0,
            ..ScoringConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
