//! Location Resolution Module
//!
//! This module turns free-text location input (a "lat,lon" pair or a place
//! name) into a structured `Location`.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::Result;
use crate::error::{AstrocastError, Provider};
use crate::models::Location;
use crate::weather::Geocoder;

/// Parsed form of a location query
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// Coordinates (latitude, longitude)
    Coordinates(f64, f64),
    /// Location name (city, region, etc.)
    Name(String),
}

/// Location input parser
pub struct LocationParser;

impl LocationParser {
    /// Parse location input; anything that is not a valid coordinate pair is a name
    pub fn parse(input: &str) -> Result<LocationInput> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AstrocastError::validation("Empty city"));
        }

        if let Some((lat, lon)) = Self::parse_coordinates(input) {
            return Ok(LocationInput::Coordinates(lat, lon));
        }

        Ok(LocationInput::Name(input.to_string()))
    }

    /// Parse coordinates from string like "46.8182,8.2275" or "46.8182 8.2275"
    fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        let [lat, lon] = parts.as_slice() else {
            return None;
        };

        let lat = lat.parse::<f64>().ok()?;
        let lon = lon.parse::<f64>().ok()?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }

        Some((lat, lon))
    }
}

/// Service for resolving location inputs
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Resolve a location query into a structured Location
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve(&self, query: &str) -> Result<Location> {
        let location = match LocationParser::parse(query)? {
            LocationInput::Coordinates(lat, lon) => {
                Location::new(lat, lon, Location::coordinate_label(lat, lon))
            }
            LocationInput::Name(name) => self.resolve_name(&name).await?,
        };

        debug!(
            "Resolved location: {} at ({}, {})",
            location.name, location.latitude, location.longitude
        );

        Ok(location)
    }

    /// Resolve a location name to coordinates via geocoding
    async fn resolve_name(&self, name: &str) -> Result<Location> {
        debug!("Geocoding location name: {}", name);

        self.geocoder
            .geocode(name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AstrocastError::provider(Provider::Geocoding, format!("Location not found: {name}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticGeocoder(Vec<Location>);

    #[async_trait]
    impl Geocoder for StaticGeocoder {
        async fn geocode(&self, _query: &str) -> Result<Vec<Location>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_location_parser_coordinates() {
        assert_eq!(
            LocationParser::parse("46.8182,8.2275").unwrap(),
            LocationInput::Coordinates(46.8182, 8.2275)
        );
        assert_eq!(
            LocationParser::parse("46.8182 8.2275").unwrap(),
            LocationInput::Coordinates(46.8182, 8.2275)
        );
        assert_eq!(
            LocationParser::parse("-46.8182, -8.2275").unwrap(),
            LocationInput::Coordinates(-46.8182, -8.2275)
        );
    }

    #[test]
    fn test_out_of_range_coordinates_are_names() {
        assert!(matches!(
            LocationParser::parse("91.0,8.0").unwrap(),
            LocationInput::Name(_)
        ));
        assert!(matches!(
            LocationParser::parse("46.0,-181.0").unwrap(),
            LocationInput::Name(_)
        ));
    }

    #[test]
    fn test_location_parser_names() {
        assert_eq!(
            LocationParser::parse("  New York ").unwrap(),
            LocationInput::Name("New York".to_string())
        );
        assert!(matches!(
            LocationParser::parse("Paris").unwrap(),
            LocationInput::Name(_)
        ));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = LocationParser::parse("   ").unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_coordinates_bypass_geocoding() {
        let resolver = LocationResolver::new(Arc::new(StaticGeocoder(Vec::new())));
        let location = resolver.resolve("46.8182,8.2275").await.unwrap();
        assert_eq!(location.name, "46.8182, 8.2275");
        assert_eq!(location.latitude, 46.8182);
    }

    #[tokio::test]
    async fn test_first_geocoding_result_wins() {
        let resolver = LocationResolver::new(Arc::new(StaticGeocoder(vec![
            Location::new(48.8566, 2.3522, "Paris".to_string()),
            Location::new(33.66, -95.55, "Paris".to_string()),
        ])));
        let location = resolver.resolve("Paris").await.unwrap();
        assert_eq!(location.latitude, 48.8566);
    }

    #[tokio::test]
    async fn test_unknown_name_is_a_geocoding_error() {
        let resolver = LocationResolver::new(Arc::new(StaticGeocoder(Vec::new())));
        let err = resolver.resolve("Atlantis").await.unwrap_err();
        assert_eq!(err.to_string(), "Geocoding error: Location not found: Atlantis");
    }
}
