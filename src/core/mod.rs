pub mod assembler;
pub mod discovery;
pub mod normalizer;
pub mod radius;
pub mod ranker;
pub mod request;
pub mod resolver;
pub mod spatial;

pub use crate::domain::model::{DiscoveryResult, Facility, FacilityCategory, SearchRequest};
pub use crate::domain::ports::{Geocoder, MapDataSource};
pub use crate::utils::error::Result;
