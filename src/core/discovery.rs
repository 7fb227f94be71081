use crate::adapters::{NominatimGeocoder, OverpassClient};
use crate::config::ServiceConfig;
use crate::domain::model::{
    CategoryQueryResult, Coordinate, DiscoveryResult, FacilityCategory, SearchRequest,
};
use crate::domain::ports::{Geocoder, MapDataSource};
use crate::utils::error::Result;
use futures_util::future::join_all;
use tracing::Instrument;
use uuid::Uuid;

use super::assembler::ResultAssembler;
use super::normalizer::FacilityNormalizer;
use super::radius::RadiusPolicy;
use super::ranker::DistanceRanker;
use super::request::DiscoveryRequest;
use super::resolver::LocationResolver;
use super::spatial::SpatialQueryClient;

/// Runs one discovery call end to end: resolve, query each category, normalize, rank, assemble.
pub struct DiscoveryEngine<G: Geocoder, M: MapDataSource> {
    policy: RadiusPolicy,
    resolver: LocationResolver<G>,
    spatial: SpatialQueryClient<M>,
    normalizer: FacilityNormalizer,
    ranker: DistanceRanker,
    assembler: ResultAssembler,
    parallel_category_queries: bool,
}

impl DiscoveryEngine<NominatimGeocoder, OverpassClient> {
    /// HTTP-backed engine for the endpoints in `config`.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let geocoder = NominatimGeocoder::new(&config.geocoder)?;
        let overpass = OverpassClient::new(&config.overpass)?;
        Ok(Self::new(geocoder, overpass, config))
    }
}

impl<G: Geocoder, M: MapDataSource> DiscoveryEngine<G, M> {
    pub fn new(geocoder: G, map_data: M, config: &ServiceConfig) -> Self {
        Self {
            policy: RadiusPolicy,
            resolver: LocationResolver::new(geocoder, &config.geocoder),
            spatial: SpatialQueryClient::new(map_data, config.overpass.query_timeout_seconds),
            normalizer: FacilityNormalizer::new(config.discovery.directions_base_url.clone()),
            ranker: DistanceRanker::default(),
            assembler: ResultAssembler,
            parallel_category_queries: config.discovery.parallel_category_queries,
        }
    }

    /// Entry point for raw request bodies. Never fails; errors become `{"error": ...}`.
    pub async fn discover_json(&self, body: &str) -> DiscoveryResult {
        async move {
            match DiscoveryRequest::from_json(body) {
                Ok(request) => self.discover_request(request).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Rejected request body");
                    self.assembler.fail(&e)
                }
            }
        }
        .instrument(request_span())
        .await
    }

    pub async fn discover(&self, request: DiscoveryRequest) -> DiscoveryResult {
        self.discover_request(request).instrument(request_span()).await
    }

    async fn discover_request(&self, request: DiscoveryRequest) -> DiscoveryResult {
        let search = match request.into_search(&self.policy) {
            Ok(search) => search,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid discovery request");
                return self.assembler.fail(&e);
            }
        };

        match self.run(&search).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    kind = ?e.kind(),
                    suggestion = e.recovery_suggestion(),
                    "Discovery failed"
                );
                self.assembler.fail(&e)
            }
        }
    }

    /// Discovery for an already validated request, with errors left typed.
    pub async fn run(&self, search: &SearchRequest) -> Result<DiscoveryResult> {
        tracing::info!(
            address = %search.address,
            radius = search.radius_meters,
            "Searching for medical facilities"
        );

        let location = self.resolver.resolve(&search.address).await?;
        let origin = location.coordinate;

        let category_results = self.query_categories(origin, search.radius_meters).await?;

        let mut normalized = Vec::new();
        for result in category_results {
            for raw in result.records {
                if let Some(facility) = self.normalizer.normalize(origin, raw) {
                    normalized.push(facility);
                }
            }
        }

        let facilities = self.ranker.rank(origin, normalized);
        let result = self
            .assembler
            .assemble(origin, location.canonical_address, facilities);

        if let Some(report) = result.report() {
            tracing::info!(
                hospitals = report.stats.hospitals,
                pharmacies = report.stats.pharmacies,
                "Discovery finished"
            );
        }
        Ok(result)
    }

    /// One query per category, returned in `FacilityCategory::ALL` order.
    ///
    /// Concurrent queries are joined before inspection, so the first failing
    /// category in that order decides the error, not whichever finished first.
    async fn query_categories(
        &self,
        origin: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<CategoryQueryResult>> {
        if self.parallel_category_queries {
            let queries = FacilityCategory::ALL
                .iter()
                .map(|category| self.spatial.query(origin, radius_meters, *category));
            join_all(queries).await.into_iter().collect()
        } else {
            let mut results = Vec::with_capacity(FacilityCategory::ALL.len());
            for category in FacilityCategory::ALL {
                results.push(self.spatial.query(origin, radius_meters, category).await?);
            }
            Ok(results)
        }
    }
}

/// One span per call, so every log line of a request carries the same id.
fn request_span() -> tracing::Span {
    let request_id = Uuid::new_v4();
    tracing::info_span!("discovery", %request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        GeocodeQuery, GeocodedPlace, MapDataError, MapDataResponse, MapNode, MapWay,
    };
    use crate::utils::error::{ErrorKind, LocatorError, GENERIC_FAILURE_MESSAGE, RATE_LIMITED_MESSAGE};
    use serde_json::json;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct MockGeocoder {
        places: Vec<GeocodedPlace>,
        calls: Arc<Mutex<usize>>,
    }

    impl MockGeocoder {
        fn at(lat: f64, lon: f64) -> Self {
            Self {
                places: vec![GeocodedPlace {
                    lat,
                    lon,
                    display_name: "Connaught Place, New Delhi, India".to_string(),
                }],
                calls: Arc::default(),
            }
        }

        fn nowhere() -> Self {
            Self {
                places: Vec::new(),
                calls: Arc::default(),
            }
        }
    }

    #[async_trait::async_trait]
    impl Geocoder for MockGeocoder {
        async fn geocode(&self, _query: &GeocodeQuery) -> Result<Vec<GeocodedPlace>> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.places.clone())
        }
    }

    /// Answers by the amenity named in the query expression.
    #[derive(Clone, Default)]
    struct MockMapData {
        hospitals: Option<std::result::Result<MapDataResponse, MapDataError>>,
        pharmacies: Option<std::result::Result<MapDataResponse, MapDataError>>,
        queries: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl MapDataSource for MockMapData {
        async fn query(&self, expression: &str) -> std::result::Result<MapDataResponse, MapDataError> {
            self.queries.lock().unwrap().push(expression.to_string());
            let answer = if expression.contains("\"hospital\"") {
                &self.hospitals
            } else {
                &self.pharmacies
            };
            answer.clone().unwrap_or_else(|| Ok(MapDataResponse::default()))
        }
    }

    fn node(id: i64, amenity: &str, name: Option<&str>, lat: f64, lon: f64) -> MapNode {
        let mut tags = HashMap::from([("amenity".to_string(), amenity.to_string())]);
        if let Some(name) = name {
            tags.insert("name".to_string(), name.to_string());
        }
        MapNode { id, lat, lon, tags }
    }

    fn engine(geocoder: MockGeocoder, map_data: MockMapData, parallel: bool) -> DiscoveryEngine<MockGeocoder, MockMapData> {
        let mut config = ServiceConfig::default();
        config.discovery.parallel_category_queries = parallel;
        DiscoveryEngine::new(geocoder, map_data, &config)
    }

    fn delhi_data() -> MockMapData {
        MockMapData {
            hospitals: Some(Ok(MapDataResponse {
                nodes: vec![
                    node(1, "hospital", Some("Far Hospital"), 28.6515, 77.2167),
                    node(2, "hospital", None, 28.6335, 77.2167),
                ],
                ways: vec![MapWay {
                    id: 3,
                    node_ids: vec![10, 11, 12],
                    tags: HashMap::from([("amenity".to_string(), "hospital".to_string())]),
                }],
            })),
            pharmacies: Some(Ok(MapDataResponse {
                nodes: vec![node(4, "pharmacy", Some("Corner Chemist"), 28.6415, 77.2167)],
                ways: Vec::new(),
            })),
            queries: Arc::default(),
        }
    }

    #[tokio::test]
    async fn test_scenario_two_hospitals_one_pharmacy() {
        for parallel in [true, false] {
            let engine = engine(MockGeocoder::at(28.6315, 77.2167), delhi_data(), parallel);
            let result = engine.discover(DiscoveryRequest::new("Connaught Place", Some(3000))).await;

            let report = result.report().expect("success");
            assert_eq!(report.facilities.len(), 3);
            assert_eq!(report.stats.hospitals, 2);
            assert_eq!(report.stats.pharmacies, 1);

            let names: Vec<&str> = report.facilities.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, vec!["Hospital", "Corner Chemist", "Far Hospital"]);
            assert!(report
                .facilities
                .windows(2)
                .all(|w| w[0].distance_km <= w[1].distance_km));
        }
    }

    #[tokio::test]
    async fn test_one_query_per_category_in_fixed_order() {
        let data = delhi_data();
        let queries = data.queries.clone();
        let engine = engine(MockGeocoder::at(28.6315, 77.2167), data, false);
        engine.discover(DiscoveryRequest::new("Connaught Place", None)).await;

        let queries = queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert!(queries[0].contains("\"hospital\"") && !queries[0].contains("\"pharmacy\""));
        assert!(queries[1].contains("\"pharmacy\""));
        assert!(queries[0].contains("(around:5000,28.6315,77.2167)"));
    }

    #[tokio::test]
    async fn test_location_failure_skips_spatial_queries() {
        let data = MockMapData::default();
        let queries = data.queries.clone();
        let engine = engine(MockGeocoder::nowhere(), data, true);

        let result = engine.discover(DiscoveryRequest::new("Atlantis", None)).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::LocationNotFound));
        assert!(queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_address_never_geocodes() {
        let geocoder = MockGeocoder::at(0.0, 0.0);
        let calls = geocoder.calls.clone();
        let engine = engine(geocoder, MockMapData::default(), true);

        let result = engine.discover_json(r#"{"address": "", "radius": 2000}"#).await;
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({"error": "Please provide an address"})
        );
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_on_either_category_fails_whole_call() {
        for (hospitals, pharmacies) in [
            (Some(Err(MapDataError::TooManyRequests)), None),
            (None, Some(Err(MapDataError::TooManyRequests))),
        ] {
            let data = MockMapData {
                hospitals,
                pharmacies,
                queries: Arc::default(),
            };
            let engine = engine(MockGeocoder::at(28.6315, 77.2167), data, true);
            let result = engine.discover(DiscoveryRequest::new("Connaught Place", None)).await;

            let value = serde_json::to_value(&result).unwrap();
            assert_eq!(value, serde_json::json!({"error": RATE_LIMITED_MESSAGE}));
        }
    }

    #[tokio::test]
    async fn test_first_category_error_wins_when_both_fail() {
        let data = MockMapData {
            hospitals: Some(Err(MapDataError::GatewayTimeout)),
            pharmacies: Some(Err(MapDataError::TooManyRequests)),
            queries: Arc::default(),
        };
        let engine = engine(MockGeocoder::at(28.6315, 77.2167), data, true);
        let search = SearchRequest {
            address: "Connaught Place".to_string(),
            radius_meters: 5000,
        };

        let err = engine.run(&search).await.unwrap_err();
        assert!(matches!(
            err,
            LocatorError::SpatialTimeout {
                category: FacilityCategory::Hospital
            }
        ));
    }

    #[tokio::test]
    async fn test_sequential_mode_stops_after_first_failure() {
        let data = MockMapData {
            hospitals: Some(Err(MapDataError::Provider("boom".to_string()))),
            pharmacies: None,
            queries: Arc::default(),
        };
        let queries = data.queries.clone();
        let engine = engine(MockGeocoder::at(28.6315, 77.2167), data, false);

        let result = engine.discover(DiscoveryRequest::new("Connaught Place", None)).await;
        assert_eq!(result.error_kind(), Some(ErrorKind::SpatialProviderError));
        assert_eq!(queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_categories_are_success() {
        let engine = engine(MockGeocoder::at(28.6315, 77.2167), MockMapData::default(), true);
        let result = engine.discover(DiscoveryRequest::new("Connaught Place", None)).await;

        let report = result.report().unwrap();
        assert!(report.facilities.is_empty());
        assert_eq!(report.stats.hospitals + report.stats.pharmacies, 0);
    }

    #[tokio::test]
    async fn test_malformed_body_returns_generic_error() {
        let geocoder = MockGeocoder::at(28.6315, 77.2167);
        let calls = geocoder.calls.clone();
        let engine = engine(geocoder, delhi_data(), true);

        for body in ["{not json", "[1, 2]"] {
            let result = engine.discover_json(body).await;
            assert_eq!(result.error_kind(), Some(ErrorKind::Internal));
            assert_eq!(
                serde_json::to_value(&result).unwrap(),
                json!({"error": GENERIC_FAILURE_MESSAGE})
            );
        }
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unconvertible_radius_is_input_error() {
        let engine = engine(MockGeocoder::at(28.6315, 77.2167), delhi_data(), true);
        let result = engine
            .discover_json(r#"{"address": "Connaught Place", "radius": "five km"}"#)
            .await;

        assert_eq!(result.error_kind(), Some(ErrorKind::InputError));
        let value = serde_json::to_value(&result).unwrap();
        assert!(value["error"].as_str().unwrap().starts_with("Invalid input"));
    }

    /// Shared buffer the log subscriber writes into.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_rejected_body_is_logged_with_request_id() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let engine = engine(MockGeocoder::nowhere(), MockMapData::default(), true);
        engine.discover_json("{not json").await;

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|line| line.contains("Rejected request body"))
            .unwrap();
        let entry: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(entry["span"]["name"], "discovery");
        assert!(entry["span"]["request_id"].as_str().is_some_and(|id| !id.is_empty()));
    }
}
