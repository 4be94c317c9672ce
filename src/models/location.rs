//! A resolved place the dashboard fetches data for

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// City name as geocoded, or a coordinate label for "lat,lon" input
    pub name: String,
    /// ISO 3166-1 alpha-2 code when the geocoder reports one
    pub country: Option<String>,
}

impl Location {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
            country: None,
        }
    }

    #[must_use]
    pub fn with_country(latitude: f64, longitude: f64, name: String, country: String) -> Self {
        Self {
            country: Some(country),
            ..Self::new(latitude, longitude, name)
        }
    }

    /// Name given to a location entered as raw coordinates
    #[must_use]
    pub fn coordinate_label(latitude: f64, longitude: f64) -> String {
        format!("{latitude:.4}, {longitude:.4}")
    }

    /// Cache key for one kind of lookup; coordinates are rounded to about 1 km
    #[must_use]
    pub fn cache_key(&self, kind: &str) -> String {
        let round = |v: f64| (v * 100.0).round() / 100.0;
        format!("{kind}:{:.2}:{:.2}", round(self.latitude), round(self.longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_rounds_coordinates() {
        let london = Location::new(51.5074, -0.1278, "London".to_string());
        assert_eq!(london.cache_key("forecast"), "forecast:51.51:-0.13");

        let nearby = Location::new(51.5091, -0.1301, "Westminster".to_string());
        assert_eq!(nearby.cache_key("forecast"), london.cache_key("forecast"));
    }

    #[test]
    fn test_coordinate_label() {
        assert_eq!(Location::coordinate_label(48.85661, 2.35222), "48.8566, 2.3522");
    }

    #[test]
    fn test_with_country() {
        let paris = Location::with_country(48.85, 2.35, "Paris".to_string(), "FR".to_string());
        assert_eq!(paris.country.as_deref(), Some("FR"));
        assert_eq!(paris.name, "Paris");
    }
}
