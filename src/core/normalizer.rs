use crate::config::toml_config::DEFAULT_DIRECTIONS_BASE_URL;
use crate::domain::model::{
    Coordinate, FacilityCategory, FacilityDetails, Geometry, HospitalDetails, NormalizedFacility,
    PharmacyDetails, RawFacilityRecord,
};
use crate::utils::html;

const PHONE_FALLBACK: &str = "Not available";
const UNKNOWN: &str = "Unknown";
const HEALTHCARE_FALLBACK: &str = "General";
const OPENING_HOURS_FALLBACK: &str = "Not specified";
const ADDRESS_FALLBACK: &str = "Address not available";
const TRAVEL_MODE: &str = "driving";

/// Turns tagged point records into typed facilities with every field populated.
#[derive(Debug, Clone)]
pub struct FacilityNormalizer {
    directions_base_url: String,
}

impl Default for FacilityNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTIONS_BASE_URL)
    }
}

impl FacilityNormalizer {
    pub fn new(directions_base_url: impl Into<String>) -> Self {
        Self {
            directions_base_url: directions_base_url.into(),
        }
    }

    /// `None` for way geometry: ways are fetched but not rendered.
    pub fn normalize(&self, origin: Coordinate, raw: RawFacilityRecord) -> Option<NormalizedFacility> {
        let coordinate = match &raw.geometry {
            Geometry::Point(coordinate) => *coordinate,
            Geometry::Way { .. } => return None,
        };

        let name = raw.tag("name").unwrap_or(raw.category.default_label());
        let details = details_for(&raw);

        Some(NormalizedFacility {
            category: raw.category,
            name: html::escape(name),
            coordinate,
            details,
            directions_url: self.directions_url(origin, coordinate),
        })
    }

    pub fn directions_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        format!(
            "{}?api=1&origin={}&destination={}&travelmode={}",
            self.directions_base_url, origin, destination, TRAVEL_MODE
        )
    }
}

fn details_for(raw: &RawFacilityRecord) -> FacilityDetails {
    let tag_or = |key: &str, fallback: &str| raw.tag(key).unwrap_or(fallback).to_string();
    let address = raw
        .tag("addr:full")
        .or_else(|| raw.tag("addr:street"))
        .unwrap_or(ADDRESS_FALLBACK)
        .to_string();

    match raw.category {
        FacilityCategory::Hospital => FacilityDetails::Hospital(HospitalDetails {
            phone: tag_or("phone", PHONE_FALLBACK),
            emergency: tag_or("emergency", UNKNOWN),
            healthcare: tag_or("healthcare", HEALTHCARE_FALLBACK),
            opening_hours: tag_or("opening_hours", OPENING_HOURS_FALLBACK),
            website: tag_or("website", ""),
            wheelchair: tag_or("wheelchair", UNKNOWN),
            address,
        }),
        FacilityCategory::Pharmacy => FacilityDetails::Pharmacy(PharmacyDetails {
            phone: tag_or("phone", PHONE_FALLBACK),
            opening_hours: tag_or("opening_hours", OPENING_HOURS_FALLBACK),
            website: tag_or("website", ""),
            wheelchair: tag_or("wheelchair", UNKNOWN),
            address,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn point(category: FacilityCategory, tags: &[(&str, &str)]) -> RawFacilityRecord {
        RawFacilityRecord {
            id: 7,
            category,
            geometry: Geometry::Point(Coordinate { lat: 28.64, lon: 77.21 }),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn origin() -> Coordinate {
        Coordinate { lat: 28.6315, lon: 77.2167 }
    }

    #[test]
    fn test_untagged_hospital_gets_all_defaults() {
        let facility = FacilityNormalizer::default()
            .normalize(origin(), point(FacilityCategory::Hospital, &[("amenity", "hospital")]))
            .unwrap();

        assert_eq!(facility.name, "Hospital");
        assert_eq!(
            facility.details,
            FacilityDetails::Hospital(HospitalDetails {
                phone: "Not available".to_string(),
                emergency: "Unknown".to_string(),
                healthcare: "General".to_string(),
                opening_hours: "Not specified".to_string(),
                website: String::new(),
                wheelchair: "Unknown".to_string(),
                address: "Address not available".to_string(),
            })
        );
    }

    #[test]
    fn test_pharmacy_uses_tags_and_escapes_name() {
        let facility = FacilityNormalizer::default()
            .normalize(
                origin(),
                point(
                    FacilityCategory::Pharmacy,
                    &[
                        ("name", "Guardian <b>& Sons</b>"),
                        ("phone", "+91 11 2334 5678"),
                        ("opening_hours", "Mo-Sa 09:00-21:00"),
                        ("addr:street", "Janpath"),
                        ("emergency", "yes"),
                    ],
                ),
            )
            .unwrap();

        assert_eq!(facility.name, "Guardian &lt;b&gt;&amp; Sons&lt;/b&gt;");
        match facility.details {
            FacilityDetails::Pharmacy(details) => {
                assert_eq!(details.phone, "+91 11 2334 5678");
                assert_eq!(details.opening_hours, "Mo-Sa 09:00-21:00");
                assert_eq!(details.address, "Janpath");
                assert_eq!(details.wheelchair, "Unknown");
            }
            other => panic!("expected pharmacy details, got {:?}", other),
        }
    }

    #[test]
    fn test_full_address_wins_over_street() {
        let facility = FacilityNormalizer::default()
            .normalize(
                origin(),
                point(
                    FacilityCategory::Hospital,
                    &[("addr:full", "1 Baba Kharak Singh Marg"), ("addr:street", "BKS Marg")],
                ),
            )
            .unwrap();
        match facility.details {
            FacilityDetails::Hospital(details) => assert_eq!(details.address, "1 Baba Kharak Singh Marg"),
            other => panic!("expected hospital details, got {:?}", other),
        }
    }

    #[test]
    fn test_way_is_not_rendered() {
        let way = RawFacilityRecord {
            id: 99,
            category: FacilityCategory::Hospital,
            geometry: Geometry::Way {
                node_ids: vec![1, 2, 3],
            },
            tags: HashMap::new(),
        };
        assert!(FacilityNormalizer::default().normalize(origin(), way).is_none());
    }

    #[test]
    fn test_directions_url_embeds_exact_coordinates() {
        let url = FacilityNormalizer::default().directions_url(
            Coordinate { lat: 28.6315, lon: 77.2167 },
            Coordinate { lat: 28.6448, lon: -77.25 },
        );
        assert_eq!(
            url,
            "https://www.google.com/maps/dir/?api=1&origin=28.6315,77.2167&destination=28.6448,-77.25&travelmode=driving"
        );
    }
}
