use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Constraints sent along with a free-text geocoding query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeQuery {
    pub text: String,
    pub country_codes: String,
    pub language: String,
    pub exactly_one: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

/// External geocoding service. An empty vector means "no match".
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &GeocodeQuery) -> Result<Vec<GeocodedPlace>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapWay {
    pub id: i64,
    pub node_ids: Vec<i64>,
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapDataResponse {
    pub nodes: Vec<MapNode>,
    pub ways: Vec<MapWay>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapDataError {
    #[error("too many requests")]
    TooManyRequests,

    #[error("gateway timeout")]
    GatewayTimeout,

    #[error("{0}")]
    Provider(String),
}

/// External map-data query service (Overpass QL expressions).
#[async_trait]
pub trait MapDataSource: Send + Sync {
    async fn query(&self, expression: &str) -> std::result::Result<MapDataResponse, MapDataError>;
}
