use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::utils::error::{ErrorKind, LocatorError, Result};

/// WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(LocatorError::InvalidInput {
                message: format!("latitude {} is outside [-90, 90]", lat),
            });
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(LocatorError::InvalidInput {
                message: format!("longitude {} is outside [-180, 180]", lon),
            });
        }
        Ok(Self { lat, lon })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Validated discovery input. `radius_meters` is already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub address: String,
    pub radius_meters: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityCategory {
    Hospital,
    Pharmacy,
}

impl FacilityCategory {
    /// Query order. Discovery order (and therefore tie-breaking) follows it.
    pub const ALL: [FacilityCategory; 2] = [FacilityCategory::Hospital, FacilityCategory::Pharmacy];

    /// Value of the `amenity` tag selecting this category in map data.
    pub fn amenity(self) -> &'static str {
        match self {
            FacilityCategory::Hospital => "hospital",
            FacilityCategory::Pharmacy => "pharmacy",
        }
    }

    /// Display name used when a record carries no `name` tag.
    pub fn default_label(self) -> &'static str {
        match self {
            FacilityCategory::Hospital => "Hospital",
            FacilityCategory::Pharmacy => "Pharmacy",
        }
    }
}

impl fmt::Display for FacilityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.amenity())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    Way,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coordinate),
    Way { node_ids: Vec<i64> },
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Way { .. } => GeometryKind::Way,
        }
    }
}

/// Tagged element as returned by the map-data provider, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFacilityRecord {
    pub id: i64,
    pub category: FacilityCategory,
    pub geometry: Geometry,
    pub tags: HashMap<String, String>,
}

impl RawFacilityRecord {
    pub fn geometry_kind(&self) -> GeometryKind {
        self.geometry.kind()
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Records of one category query plus element counts for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryQueryResult {
    pub category: FacilityCategory,
    pub records: Vec<RawFacilityRecord>,
    pub node_count: usize,
    pub way_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HospitalDetails {
    pub phone: String,
    pub emergency: String,
    pub healthcare: String,
    pub opening_hours: String,
    pub website: String,
    pub wheelchair: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PharmacyDetails {
    pub phone: String,
    pub opening_hours: String,
    pub website: String,
    pub wheelchair: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FacilityDetails {
    Hospital(HospitalDetails),
    Pharmacy(PharmacyDetails),
}

/// A point record after tag normalization, still without a distance.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFacility {
    pub category: FacilityCategory,
    pub name: String,
    pub coordinate: Coordinate,
    pub details: FacilityDetails,
    pub directions_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facility {
    #[serde(rename = "type")]
    pub category: FacilityCategory,
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(rename = "distance")]
    pub distance_km: f64,
    pub details: FacilityDetails,
    pub directions_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserLocation {
    pub lat: f64,
    pub lon: f64,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FacilityStats {
    pub hospitals: usize,
    pub pharmacies: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryReport {
    pub user_location: UserLocation,
    pub facilities: Vec<Facility>,
    pub stats: FacilityStats,
}

impl DiscoveryReport {
    pub fn origin(&self) -> Coordinate {
        Coordinate {
            lat: self.user_location.lat,
            lon: self.user_location.lon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    #[serde(skip)]
    pub kind: ErrorKind,
    pub error: String,
}

/// Outcome of one discovery call. Serializes to the success body or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiscoveryResult {
    Success(DiscoveryReport),
    Failure(ErrorPayload),
}

impl DiscoveryResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DiscoveryResult::Success(_))
    }

    pub fn report(&self) -> Option<&DiscoveryReport> {
        match self {
            DiscoveryResult::Success(report) => Some(report),
            DiscoveryResult::Failure(_) => None,
        }
    }

    /// Response body as sent to the caller.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let body = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(body)
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            DiscoveryResult::Success(_) => None,
            DiscoveryResult::Failure(payload) => Some(payload.kind),
        }
    }
}
