use crate::domain::model::{
    CategoryQueryResult, Coordinate, FacilityCategory, Geometry, RawFacilityRecord,
};
use crate::domain::ports::{MapDataError, MapDataResponse, MapDataSource};
use crate::utils::error::{LocatorError, Result};

pub const DEFAULT_QUERY_TIMEOUT_SECONDS: u64 = 25;

/// Builds the per-category Overpass query and converts its answer into raw records.
pub struct SpatialQueryClient<M: MapDataSource> {
    source: M,
    query_timeout_seconds: u64,
}

impl<M: MapDataSource> SpatialQueryClient<M> {
    pub fn new(source: M, query_timeout_seconds: u64) -> Self {
        Self {
            source,
            query_timeout_seconds,
        }
    }

    /// Nodes and ways tagged `amenity=<category>` within `radius_meters` of `origin`.
    pub fn build_query(&self, origin: Coordinate, radius_meters: u32, category: FacilityCategory) -> String {
        let around = format!("(around:{},{},{})", radius_meters, origin.lat, origin.lon);
        format!(
            "[out:json][timeout:{timeout}];(node[\"amenity\"=\"{tag}\"]{around};way[\"amenity\"=\"{tag}\"]{around};);out body;",
            timeout = self.query_timeout_seconds,
            tag = category.amenity(),
            around = around,
        )
    }

    pub async fn query(
        &self,
        origin: Coordinate,
        radius_meters: u32,
        category: FacilityCategory,
    ) -> Result<CategoryQueryResult> {
        let expression = self.build_query(origin, radius_meters, category);
        tracing::debug!(%category, radius = radius_meters, "Querying map data");

        let response = self
            .source
            .query(&expression)
            .await
            .map_err(|e| classify_failure(category, e))?;

        let result = into_records(category, response);
        tracing::info!(
            %category,
            nodes = result.node_count,
            ways = result.way_count,
            "Map data query finished"
        );
        Ok(result)
    }
}

fn classify_failure(category: FacilityCategory, error: MapDataError) -> LocatorError {
    match error {
        MapDataError::TooManyRequests => {
            tracing::warn!(%category, "Overpass API rate limit exceeded");
            LocatorError::SpatialRateLimited { category }
        }
        MapDataError::GatewayTimeout => {
            tracing::warn!(%category, "Overpass API timeout");
            LocatorError::SpatialTimeout { category }
        }
        MapDataError::Provider(message) => {
            tracing::error!(%category, error = %message, "Overpass API error");
            LocatorError::SpatialProvider { category, message }
        }
    }
}

/// Nodes first, then ways, each in provider order.
///
/// Nodes without the category's amenity tag are geometry members of some way,
/// not facilities, and are dropped. Nodes with out-of-range coordinates are
/// dropped as well.
fn into_records(category: FacilityCategory, response: MapDataResponse) -> CategoryQueryResult {
    let node_count = response.nodes.len();
    let way_count = response.ways.len();
    let mut records = Vec::with_capacity(node_count + way_count);

    for node in response.nodes {
        if node.tags.get("amenity").map(String::as_str) != Some(category.amenity()) {
            continue;
        }
        match Coordinate::new(node.lat, node.lon) {
            Ok(coordinate) => records.push(RawFacilityRecord {
                id: node.id,
                category,
                geometry: Geometry::Point(coordinate),
                tags: node.tags,
            }),
            Err(e) => tracing::warn!(%category, id = node.id, error = %e, "Skipping node"),
        }
    }

    for way in response.ways {
        records.push(RawFacilityRecord {
            id: way.id,
            category,
            geometry: Geometry::Way {
                node_ids: way.node_ids,
            },
            tags: way.tags,
        });
    }

    CategoryQueryResult {
        category,
        records,
        node_count,
        way_count,
    }
}
