use serde::Serialize;
use thiserror::Error;

use crate::domain::model::FacilityCategory;

pub const MISSING_ADDRESS_MESSAGE: &str = "Please provide an address";
pub const NO_DATA_MESSAGE: &str = "No data provided";
pub const GEOCODING_FAILED_MESSAGE: &str =
    "Failed to find the location. Please try a more specific address.";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";
pub const TIMEOUT_MESSAGE: &str = "The search took too long. Please try with a smaller radius.";
pub const PROVIDER_FAILED_MESSAGE: &str = "Failed to fetch medical facilities. Please try again.";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An error occurred while searching for medical facilities. Please try again.";

/// Coarse classification callers match on instead of inspecting error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InputError,
    LocationNotFound,
    GeocodingError,
    SpatialRateLimited,
    SpatialTimeout,
    SpatialProviderError,
    Internal,
}

#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("No data provided")]
    EmptyRequest,

    #[error("Address is missing or blank")]
    MissingAddress,

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Body is not a JSON object of the expected shape. Parser detail stays in logs.
    #[error("Malformed request body: {message}")]
    MalformedRequest { message: String },

    #[error("No geocoding match for '{address}'")]
    LocationNotFound { address: String, region: String },

    #[error("Geocoding failed: {message}")]
    Geocoding { message: String },

    #[error("Map data provider rate limited the {category} query")]
    SpatialRateLimited { category: FacilityCategory },

    #[error("Map data provider timed out on the {category} query")]
    SpatialTimeout { category: FacilityCategory },

    #[error("Map data provider failed on the {category} query: {message}")]
    SpatialProvider {
        category: FacilityCategory,
        message: String,
    },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl LocatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LocatorError::EmptyRequest
            | LocatorError::MissingAddress
            | LocatorError::InvalidInput { .. } => ErrorKind::InputError,
            LocatorError::LocationNotFound { .. } => ErrorKind::LocationNotFound,
            LocatorError::Geocoding { .. } => ErrorKind::GeocodingError,
            LocatorError::SpatialRateLimited { .. } => ErrorKind::SpatialRateLimited,
            LocatorError::SpatialTimeout { .. } => ErrorKind::SpatialTimeout,
            LocatorError::SpatialProvider { .. } => ErrorKind::SpatialProviderError,
            LocatorError::MalformedRequest { .. }
            | LocatorError::Http(_)
            | LocatorError::IoError(_)
            | LocatorError::SerializationError(_)
            | LocatorError::ConfigError { .. }
            | LocatorError::MissingConfigError { .. }
            | LocatorError::InvalidConfigValueError { .. } => ErrorKind::Internal,
        }
    }

    /// Message safe to hand back to the requester. Never carries provider detail.
    pub fn user_friendly_message(&self) -> String {
        match self {
            LocatorError::EmptyRequest => NO_DATA_MESSAGE.to_string(),
            LocatorError::MissingAddress => MISSING_ADDRESS_MESSAGE.to_string(),
            LocatorError::InvalidInput { message } => format!("Invalid input: {}", message),
            LocatorError::LocationNotFound { region, .. } => format!(
                "Could not find the specified location. Please try a more specific address in {}.",
                region
            ),
            LocatorError::Geocoding { .. } => GEOCODING_FAILED_MESSAGE.to_string(),
            LocatorError::SpatialRateLimited { .. } => RATE_LIMITED_MESSAGE.to_string(),
            LocatorError::SpatialTimeout { .. } => TIMEOUT_MESSAGE.to_string(),
            LocatorError::SpatialProvider { .. } => PROVIDER_FAILED_MESSAGE.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InputError => "Send a JSON body with a non-empty 'address' and an optional integer 'radius'",
            ErrorKind::LocationNotFound | ErrorKind::GeocodingError => {
                "Use a more specific address (street, locality, city)"
            }
            ErrorKind::SpatialRateLimited => "Wait a minute before searching again",
            ErrorKind::SpatialTimeout => "Retry with a smaller search radius",
            ErrorKind::SpatialProviderError => "Try again later or point the Overpass endpoint at another mirror",
            ErrorKind::Internal => "Check the configuration file and logs",
        }
    }
}

pub type Result<T> = std::result::Result<T, LocatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spatial_messages_do_not_depend_on_category() {
        let hospital = LocatorError::SpatialRateLimited {
            category: FacilityCategory::Hospital,
        };
        let pharmacy = LocatorError::SpatialRateLimited {
            category: FacilityCategory::Pharmacy,
        };
        assert_eq!(hospital.user_friendly_message(), RATE_LIMITED_MESSAGE);
        assert_eq!(pharmacy.user_friendly_message(), RATE_LIMITED_MESSAGE);
    }

    #[test]
    fn test_provider_detail_is_not_leaked() {
        let err = LocatorError::SpatialProvider {
            category: FacilityCategory::Hospital,
            message: "runtime error: open64 failed".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::SpatialProviderError);
        assert!(!err.user_friendly_message().contains("open64"));

        let err = LocatorError::Geocoding {
            message: "dns failure for nominatim".to_string(),
        };
        assert_eq!(err.user_friendly_message(), GEOCODING_FAILED_MESSAGE);
    }

    #[test]
    fn test_location_not_found_names_region() {
        let err = LocatorError::LocationNotFound {
            address: "nowhere".to_string(),
            region: "India".to_string(),
        };
        assert_eq!(
            err.user_friendly_message(),
            "Could not find the specified location. Please try a more specific address in India."
        );
    }

    #[test]
    fn test_config_errors_fall_back_to_generic_message() {
        let err = LocatorError::ConfigError {
            message: "bad toml".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.user_friendly_message(), GENERIC_FAILURE_MESSAGE);
    }
}
