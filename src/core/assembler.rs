use crate::domain::model::{
    Coordinate, DiscoveryReport, DiscoveryResult, ErrorPayload, Facility, FacilityCategory,
    FacilityStats, UserLocation,
};
use crate::utils::error::LocatorError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler;

impl ResultAssembler {
    pub fn assemble(
        &self,
        origin: Coordinate,
        resolved_address: impl Into<String>,
        facilities: Vec<Facility>,
    ) -> DiscoveryResult {
        let stats = FacilityStats {
            hospitals: count(&facilities, FacilityCategory::Hospital),
            pharmacies: count(&facilities, FacilityCategory::Pharmacy),
        };

        DiscoveryResult::Success(DiscoveryReport {
            user_location: UserLocation {
                lat: origin.lat,
                lon: origin.lon,
                address: resolved_address.into(),
            },
            facilities,
            stats,
        })
    }

    pub fn fail(&self, error: &LocatorError) -> DiscoveryResult {
        DiscoveryResult::Failure(ErrorPayload {
            kind: error.kind(),
            error: error.user_friendly_message(),
        })
    }
}

fn count(facilities: &[Facility], category: FacilityCategory) -> usize {
    facilities.iter().filter(|f| f.category == category).count()
}
