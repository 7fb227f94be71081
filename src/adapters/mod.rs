// Adapters layer: HTTP implementations of the domain ports.

pub mod nominatim;
pub mod overpass;

pub use nominatim::NominatimGeocoder;
pub use overpass::OverpassClient;
