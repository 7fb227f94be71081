pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::ServiceConfig;
pub use crate::core::{discovery::DiscoveryEngine, request::DiscoveryRequest};
pub use domain::model::DiscoveryResult;
pub use utils::error::{ErrorKind, LocatorError, Result};
