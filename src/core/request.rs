use crate::domain::model::SearchRequest;
use crate::utils::error::{LocatorError, Result};
use serde::Deserialize;

use super::radius::RadiusPolicy;

/// `radius` as clients actually send it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RadiusInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RadiusInput {
    /// Integer meters; floats truncate toward zero, strings must parse.
    pub fn to_meters(&self) -> Result<i64> {
        match self {
            RadiusInput::Integer(v) => Ok(*v),
            RadiusInput::Float(v) if v.is_finite() => Ok(v.trunc() as i64),
            RadiusInput::Float(v) => Err(LocatorError::InvalidInput {
                message: format!("radius {} is not a number", v),
            }),
            RadiusInput::Text(s) => s.trim().parse::<i64>().map_err(|_| LocatorError::InvalidInput {
                message: format!("invalid literal for radius: '{}'", s),
            }),
        }
    }
}

/// Request body: `{"address": string, "radius": integer?}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiscoveryRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub radius: Option<RadiusInput>,
}

impl DiscoveryRequest {
    pub fn new(address: impl Into<String>, radius: Option<i64>) -> Self {
        Self {
            address: Some(address.into()),
            radius: radius.map(RadiusInput::Integer),
        }
    }

    /// Parse a raw JSON body. Empty bodies, `null` and `{}` count as "no data".
    pub fn from_json(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Err(LocatorError::EmptyRequest);
        }
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| LocatorError::MalformedRequest {
                message: e.to_string(),
            })?;
        match &value {
            serde_json::Value::Null => return Err(LocatorError::EmptyRequest),
            serde_json::Value::Object(map) if map.is_empty() => {
                return Err(LocatorError::EmptyRequest)
            }
            serde_json::Value::Object(_) => {}
            _ => {
                return Err(LocatorError::MalformedRequest {
                    message: "request body must be a JSON object".to_string(),
                })
            }
        }
        serde_json::from_value(value).map_err(|e| LocatorError::MalformedRequest {
            message: e.to_string(),
        })
    }

    /// Address check first, then radius parsing and normalization.
    pub fn into_search(self, policy: &RadiusPolicy) -> Result<SearchRequest> {
        let address = self
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or(LocatorError::MissingAddress)?;

        let radius = self.radius.as_ref().map(RadiusInput::to_meters).transpose()?;

        Ok(SearchRequest {
            address,
            radius_meters: policy.normalize(radius),
        })
    }
}
