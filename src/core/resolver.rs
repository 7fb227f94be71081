use crate::config::toml_config::GeocoderConfig;
use crate::domain::model::Coordinate;
use crate::domain::ports::{GeocodeQuery, Geocoder};
use crate::utils::error::{LocatorError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub canonical_address: String,
}

/// Turns free text into one coordinate, biased to a single country and language.
pub struct LocationResolver<G: Geocoder> {
    geocoder: G,
    country_codes: String,
    language: String,
    region_name: String,
}

impl<G: Geocoder> LocationResolver<G> {
    pub fn new(geocoder: G, config: &GeocoderConfig) -> Self {
        Self {
            geocoder,
            country_codes: config.country_codes.clone(),
            language: config.language.clone(),
            region_name: config.region_name.clone(),
        }
    }

    pub async fn resolve(&self, address: &str) -> Result<ResolvedLocation> {
        let address = address.trim();
        if address.is_empty() {
            return Err(LocatorError::MissingAddress);
        }

        let query = GeocodeQuery {
            text: address.to_string(),
            country_codes: self.country_codes.clone(),
            language: self.language.clone(),
            exactly_one: true,
        };

        let mut places = self.geocoder.geocode(&query).await?;
        let place = match places.len() {
            0 => {
                tracing::info!(address, "No geocoding match");
                return Err(LocatorError::LocationNotFound {
                    address: address.to_string(),
                    region: self.region_name.clone(),
                });
            }
            1 => places.remove(0),
            n => {
                return Err(LocatorError::Geocoding {
                    message: format!("{} candidates for '{}', expected exactly one", n, address),
                })
            }
        };

        let coordinate =
            Coordinate::new(place.lat, place.lon).map_err(|e| LocatorError::Geocoding {
                message: e.to_string(),
            })?;

        tracing::info!(
            lat = coordinate.lat,
            lon = coordinate.lon,
            resolved = %place.display_name,
            "Found location"
        );

        Ok(ResolvedLocation {
            coordinate,
            canonical_address: place.display_name,
        })
    }
}
