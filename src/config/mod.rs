pub mod toml_config;

pub use toml_config::ServiceConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "medfinder")]
#[command(about = "Find hospitals and pharmacies near an address")]
pub struct CliConfig {
    #[arg(long, help = "Free-text address to search around")]
    pub address: Option<String>,

    #[arg(long, allow_hyphen_values = true, help = "Search radius in meters (1000-10000, default 5000)")]
    pub radius: Option<i64>,

    #[arg(long, help = "Read the request body from a JSON file instead of flags")]
    pub request: Option<String>,

    #[arg(long, short, help = "TOML service configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Override the Overpass interpreter endpoint")]
    pub overpass_endpoint: Option<String>,

    #[arg(long, help = "Run the two category queries one after the other")]
    pub sequential: bool,

    #[arg(long, help = "Pretty-print the JSON response")]
    pub pretty: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// File config (or defaults), then environment, then command-line flags.
    pub fn service_config(&self) -> crate::utils::error::Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = ServiceConfig::from_file(path)?;
                config.apply_env_overrides();
                config
            }
            None => ServiceConfig::from_env(),
        };

        if let Some(endpoint) = &self.overpass_endpoint {
            config.overpass.endpoint = endpoint.clone();
        }
        if self.sequential {
            config.discovery.parallel_category_queries = false;
        }
        Ok(config)
    }
}
