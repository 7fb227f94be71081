use crate::utils::error::{LocatorError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/";
pub const DEFAULT_USER_AGENT: &str = "medfinder_healthcare_assistant";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub geocoder: GeocoderConfig,
    pub overpass: OverpassConfig,
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub country_codes: String,
    pub language: String,
    /// Human-readable name of the biased region, used in "not found" messages.
    pub region_name: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODER_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 10,
            country_codes: "in".to_string(),
            language: "en".to_string(),
            region_name: "India".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverpassConfig {
    pub endpoint: String,
    /// Server-side cap written into each query (`[timeout:N]`).
    pub query_timeout_seconds: u64,
    /// Client-side cap on the whole HTTP exchange.
    pub request_timeout_seconds: u64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_ENDPOINT.to_string(),
            query_timeout_seconds: 25,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub parallel_category_queries: bool,
    pub directions_base_url: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            parallel_category_queries: true,
            directions_base_url: DEFAULT_DIRECTIONS_BASE_URL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LocatorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，缺少的欄位使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LocatorError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OVERPASS_URL})，未定義的變數原樣保留
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LocatorError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Defaults overlaid with `MEDFINDER_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("MEDFINDER_GEOCODER_ENDPOINT") {
            self.geocoder.endpoint = v;
        }
        if let Some(v) = lookup("MEDFINDER_USER_AGENT") {
            self.geocoder.user_agent = v;
        }
        if let Some(v) = lookup("MEDFINDER_COUNTRY_CODES") {
            self.geocoder.country_codes = v;
        }
        if let Some(v) = lookup("MEDFINDER_OVERPASS_ENDPOINT") {
            self.overpass.endpoint = v;
        }
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("geocoder.endpoint", &self.geocoder.endpoint)?;
        validation::validate_non_empty_string("geocoder.user_agent", &self.geocoder.user_agent)?;
        validation::validate_range("geocoder.timeout_seconds", self.geocoder.timeout_seconds, 1, 180)?;
        validation::validate_country_codes("geocoder.country_codes", &self.geocoder.country_codes)?;
        validation::validate_non_empty_string("geocoder.language", &self.geocoder.language)?;
        validation::validate_non_empty_string("geocoder.region_name", &self.geocoder.region_name)?;

        validation::validate_url("overpass.endpoint", &self.overpass.endpoint)?;
        validation::validate_range(
            "overpass.query_timeout_seconds",
            self.overpass.query_timeout_seconds,
            1,
            180,
        )?;
        validation::validate_range(
            "overpass.request_timeout_seconds",
            self.overpass.request_timeout_seconds,
            1,
            180,
        )?;
        if self.overpass.request_timeout_seconds < self.overpass.query_timeout_seconds {
            return Err(LocatorError::InvalidConfigValueError {
                field: "overpass.request_timeout_seconds".to_string(),
                value: self.overpass.request_timeout_seconds.to_string(),
                reason: format!(
                    "Must not be shorter than overpass.query_timeout_seconds ({})",
                    self.overpass.query_timeout_seconds
                ),
            });
        }

        validation::validate_url("discovery.directions_base_url", &self.discovery.directions_base_url)?;

        tracing::debug!("Service configuration validation passed");
        Ok(())
    }
}
