use crate::config::toml_config::GeocoderConfig;
use crate::domain::ports::{GeocodeQuery, GeocodedPlace, Geocoder};
use crate::utils::error::{LocatorError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Row of the Nominatim `/search?format=json` answer. Coordinates come as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

fn geocoding_error(message: impl Into<String>) -> LocatorError {
    LocatorError::Geocoding {
        message: message.into(),
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Vec<GeocodedPlace>> {
        let limit = if query.exactly_one { "1" } else { "10" };

        tracing::debug!("Making geocoding request to: {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query.text.as_str()),
                ("format", "json"),
                ("limit", limit),
                ("accept-language", query.language.as_str()),
                ("countrycodes", query.country_codes.as_str()),
            ])
            .send()
            .await
            .map_err(|e| geocoding_error(e.to_string()))?;

        let status = response.status();
        tracing::debug!("Geocoding response status: {}", status);
        if !status.is_success() {
            return Err(geocoding_error(format!("geocoder returned HTTP {}", status)));
        }

        let rows: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| geocoding_error(format!("malformed geocoder response: {}", e)))?;

        rows.into_iter()
            .map(|row| -> Result<GeocodedPlace> {
                let lat = row
                    .lat
                    .parse::<f64>()
                    .map_err(|_| geocoding_error(format!("bad latitude '{}'", row.lat)))?;
                let lon = row
                    .lon
                    .parse::<f64>()
                    .map_err(|_| geocoding_error(format!("bad longitude '{}'", row.lon)))?;
                Ok(GeocodedPlace {
                    lat,
                    lon,
                    display_name: row.display_name,
                })
            })
            .collect()
    }
}
