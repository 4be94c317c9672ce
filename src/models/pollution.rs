use serde::{Deserialize, Serialize};

/// Pollutant concentrations in µg/m³
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollutantComponents {
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub nh3: f64,
}

/// Current air quality at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutionStats {
    /// Air quality index, 1 (good) to 5 (very poor)
    pub aqi: u8,
    pub label: String,
    pub components: PollutantComponents,
}
