use crate::domain::model::{Coordinate, Facility, NormalizedFacility};
use geographiclib_rs::{Geodesic, InverseGeodesic};

/// Attaches WGS-84 geodesic distances and orders facilities nearest first.
pub struct DistanceRanker {
    geodesic: Geodesic,
}

impl Default for DistanceRanker {
    fn default() -> Self {
        Self {
            geodesic: Geodesic::wgs84(),
        }
    }
}

impl DistanceRanker {
    /// Ellipsoidal distance in kilometers, unrounded.
    pub fn distance_km(&self, from: Coordinate, to: Coordinate) -> f64 {
        let meters: f64 = self.geodesic.inverse(from.lat, from.lon, to.lat, to.lon);
        meters / 1000.0
    }

    /// Rounds each distance once to two decimals, then sorts stably, so ties
    /// keep discovery order.
    pub fn rank(&self, origin: Coordinate, facilities: Vec<NormalizedFacility>) -> Vec<Facility> {
        let mut ranked: Vec<Facility> = facilities
            .into_iter()
            .map(|f| Facility {
                distance_km: round_km(self.distance_km(origin, f.coordinate)),
                category: f.category,
                name: f.name,
                coordinate: f.coordinate,
                details: f.details,
                directions_url: f.directions_url,
            })
            .collect();

        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        ranked
    }
}

/// Two decimals, halves away from zero (`f64::round`), not banker's rounding.
fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FacilityCategory, FacilityDetails, PharmacyDetails};

    fn facility(category: FacilityCategory, name: &str, lat: f64, lon: f64) -> NormalizedFacility {
        NormalizedFacility {
            category,
            name: name.to_string(),
            coordinate: Coordinate { lat, lon },
            details: FacilityDetails::Pharmacy(PharmacyDetails {
                phone: String::new(),
                opening_hours: String::new(),
                website: String::new(),
                wheelchair: String::new(),
                address: String::new(),
            }),
            directions_url: String::new(),
        }
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let ranker = DistanceRanker::default();
        let km = ranker.distance_km(Coordinate { lat: 0.0, lon: 0.0 }, Coordinate { lat: 0.0, lon: 1.0 });
        assert!((km - 111.19).abs() < 0.5, "got {}", km);
    }

    #[test]
    fn test_rank_sorts_ascending_and_rounds() {
        let origin = Coordinate { lat: 28.6315, lon: 77.2167 };
        let ranked = DistanceRanker::default().rank(
            origin,
            vec![
                facility(FacilityCategory::Hospital, "far", 28.6715, 77.2167),
                facility(FacilityCategory::Hospital, "near", 28.6335, 77.2167),
                facility(FacilityCategory::Pharmacy, "middle", 28.6515, 77.2167),
            ],
        );

        let names: Vec<&str> = ranked.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["near", "middle", "far"]);
        for f in &ranked {
            assert_eq!(f.distance_km, (f.distance_km * 100.0).round() / 100.0);
        }
        assert!(ranked.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let origin = Coordinate { lat: 28.6315, lon: 77.2167 };
        // mirror images across the origin's meridian are equidistant
        let ranked = DistanceRanker::default().rank(
            origin,
            vec![
                facility(FacilityCategory::Hospital, "east hospital", 28.6315, 77.2267),
                facility(FacilityCategory::Pharmacy, "west pharmacy", 28.6315, 77.2067),
                facility(FacilityCategory::Hospital, "close hospital", 28.6316, 77.2167),
            ],
        );

        assert_eq!(ranked[0].name, "close hospital");
        assert_eq!(ranked[1].distance_km, ranked[2].distance_km);
        assert_eq!(ranked[1].category, FacilityCategory::Hospital);
        assert_eq!(ranked[2].category, FacilityCategory::Pharmacy);
    }

    #[test]
    fn test_facility_at_origin_is_zero() {
        let origin = Coordinate { lat: 28.6315, lon: 77.2167 };
        let ranked = DistanceRanker::default().rank(
            origin,
            vec![facility(FacilityCategory::Pharmacy, "here", 28.6315, 77.2167)],
        );
        assert_eq!(ranked[0].distance_km, 0.0);
    }

    #[test]
    fn test_round_km_halves_go_up() {
        assert_eq!(round_km(0.125), 0.13);
        assert_eq!(round_km(0.625), 0.63);
        assert_eq!(round_km(1.234), 1.23);
    }
}
