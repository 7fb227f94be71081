use crate::config::toml_config::OverpassConfig;
use crate::domain::ports::{MapDataError, MapDataResponse, MapDataSource, MapNode, MapWay};
use crate::utils::error::Result;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OverpassElement {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

/// Overpass interpreter over HTTP. Status codes map onto `MapDataError`.
pub struct OverpassClient {
    client: Client,
    endpoint: String,
}

impl OverpassClient {
    pub fn new(config: &OverpassConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait::async_trait]
impl MapDataSource for OverpassClient {
    async fn query(&self, expression: &str) -> std::result::Result<MapDataResponse, MapDataError> {
        tracing::debug!("Making Overpass request to: {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", expression)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MapDataError::GatewayTimeout
                } else {
                    MapDataError::Provider(e.to_string())
                }
            })?;

        let status = response.status();
        tracing::debug!("Overpass response status: {}", status);
        match status {
            StatusCode::TOO_MANY_REQUESTS => return Err(MapDataError::TooManyRequests),
            StatusCode::GATEWAY_TIMEOUT => return Err(MapDataError::GatewayTimeout),
            s if !s.is_success() => {
                return Err(MapDataError::Provider(format!("Overpass returned HTTP {}", s)))
            }
            _ => {}
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                MapDataError::GatewayTimeout
            } else {
                MapDataError::Provider(e.to_string())
            }
        })?;
        parse_response(&body)
    }
}

/// A `remark` means the server aborted the query; results are then incomplete.
fn parse_response(body: &str) -> std::result::Result<MapDataResponse, MapDataError> {
    let parsed: OverpassResponse = serde_json::from_str(body)
        .map_err(|e| MapDataError::Provider(format!("malformed Overpass response: {}", e)))?;

    if let Some(remark) = parsed.remark.filter(|r| r.contains("error")) {
        if remark.contains("timed out") {
            return Err(MapDataError::GatewayTimeout);
        }
        return Err(MapDataError::Provider(remark));
    }

    let mut result = MapDataResponse::default();
    for element in parsed.elements {
        match element {
            OverpassElement::Node { id, lat, lon, tags } => {
                result.nodes.push(MapNode { id, lat, lon, tags })
            }
            OverpassElement::Way { id, nodes, tags } => result.ways.push(MapWay {
                id,
                node_ids: nodes,
                tags,
            }),
            OverpassElement::Other => {}
        }
    }
    Ok(result)
}
